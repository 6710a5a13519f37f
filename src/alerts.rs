//! Level-expiry alerts: tone, spoken announcement and system notification.
//!
//! Each channel sits behind a small capability trait so the fan-out never has
//! to know which browser it runs in. Channels the platform lacks are filled
//! with [`Silent`]. Every channel is best-effort: an error in one is logged
//! and the remaining channels still run.

use crate::{defaults, BlindLevel};
use log::{debug, info, warn};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Failure reported by a platform capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The API exists but is unusable right now (e.g. no audio device).
    Unavailable(&'static str),
    /// The browser threw; the message is the stringified JS error.
    Js(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Unavailable(what) => write!(f, "{} is unavailable", what),
            PlatformError::Js(msg) => write!(f, "browser error: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

/// System notification permission as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Not asked yet.
    Default,
    Granted,
    Denied,
}

/// Short decaying sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub start_gain: f32,
    pub end_gain: f32,
    pub duration_secs: f64,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            frequency_hz: defaults::TONE_FREQUENCY_HZ,
            start_gain: defaults::TONE_START_GAIN,
            end_gain: defaults::TONE_END_GAIN,
            duration_secs: defaults::TONE_DURATION_SECS,
        }
    }
}

pub trait ToneOutput {
    /// Create or resume the audio backend. Must run inside a user gesture.
    fn prepare(&self) -> Result<(), PlatformError>;
    fn play(&self, tone: &Tone) -> Result<(), PlatformError>;
}

pub trait SpeechOutput {
    /// Speak a silent utterance so the first real announcement is not delayed.
    fn prime(&self) -> Result<(), PlatformError>;
    fn speak(&self, text: &str) -> Result<(), PlatformError>;
}

pub trait SystemNotifier {
    fn permission(&self) -> Permission;
    /// Ask the user; `on_resolved` runs once the browser answers.
    fn request_permission(
        &self,
        on_resolved: Box<dyn FnOnce(Permission)>,
    ) -> Result<(), PlatformError>;
    fn show(&self, title: &str, body: &str) -> Result<(), PlatformError>;
}

/// No-op stand-in for a missing capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ToneOutput for Silent {
    fn prepare(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn play(&self, _tone: &Tone) -> Result<(), PlatformError> {
        Ok(())
    }
}

impl SpeechOutput for Silent {
    fn prime(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn speak(&self, _text: &str) -> Result<(), PlatformError> {
        Ok(())
    }
}

impl SystemNotifier for Silent {
    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn request_permission(
        &self,
        on_resolved: Box<dyn FnOnce(Permission)>,
    ) -> Result<(), PlatformError> {
        on_resolved(Permission::Denied);
        Ok(())
    }

    fn show(&self, _title: &str, _body: &str) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// What happened to one channel during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
    Failed(PlatformError),
}

impl Delivery {
    fn from_result(channel: &str, result: Result<(), PlatformError>) -> Self {
        match result {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                warn!("{} alert failed: {}", channel, e);
                Delivery::Failed(e)
            }
        }
    }
}

/// Per-channel result of [`AlertFanout::fire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutReport {
    pub tone: Delivery,
    pub speech: Delivery,
    pub notification: Delivery,
}

pub fn announcement_text(level: &BlindLevel) -> String {
    format!("Timer expired! New blind level: {} {}", level.small, level.big)
}

pub fn notification_body(level: &BlindLevel) -> String {
    format!("New blind level: {}/{}", level.small, level.big)
}

/// Fans a level expiry out to every alert channel.
pub struct AlertFanout {
    tone: Rc<dyn ToneOutput>,
    speech: Rc<dyn SpeechOutput>,
    notifier: Rc<dyn SystemNotifier>,
    /// Foreground notifications cannot be shown (iOS Safari outside the home screen).
    constrained: bool,
    permission_requested: Cell<bool>,
    speech_primed: Cell<bool>,
}

impl AlertFanout {
    pub fn new(
        tone: Rc<dyn ToneOutput>,
        speech: Rc<dyn SpeechOutput>,
        notifier: Rc<dyn SystemNotifier>,
        constrained: bool,
    ) -> Self {
        Self {
            tone,
            speech,
            notifier,
            constrained,
            permission_requested: Cell::new(false),
            speech_primed: Cell::new(false),
        }
    }

    /// Fan-out where every channel is [`Silent`].
    pub fn silent() -> Self {
        Self::new(Rc::new(Silent), Rc::new(Silent), Rc::new(Silent), false)
    }

    pub fn is_constrained(&self) -> bool {
        self.constrained
    }

    pub fn permission(&self) -> Permission {
        self.notifier.permission()
    }

    /// Work that must happen inside the user's start/pause gesture: unlock
    /// audio, ask for notification permission the first time, and prime speech.
    pub fn prepare_on_user_gesture(&self, on_permission: impl FnOnce(Permission) + 'static) {
        if let Err(e) = self.tone.prepare() {
            warn!("Could not prepare audio: {}", e);
        }

        if !self.constrained
            && !self.permission_requested.get()
            && self.notifier.permission() == Permission::Default
        {
            self.request_permission(on_permission);
        }

        if !self.speech_primed.replace(true) {
            match self.speech.prime() {
                Ok(()) => debug!("Speech engine primed"),
                Err(e) => warn!("Could not prime speech: {}", e),
            }
        }
    }

    /// Ask for notification permission. Only asks while the browser still
    /// reports [`Permission::Default`].
    pub fn request_permission(&self, on_permission: impl FnOnce(Permission) + 'static) {
        if self.notifier.permission() != Permission::Default {
            return;
        }
        self.permission_requested.set(true);
        let on_resolved = Box::new(move |permission: Permission| {
            info!("Notification permission resolved: {:?}", permission);
            on_permission(permission);
        });
        if let Err(e) = self.notifier.request_permission(on_resolved) {
            warn!("Notification permission request failed: {}", e);
        }
    }

    /// Announce `level` on every channel.
    pub fn fire(&self, level: &BlindLevel) -> FanoutReport {
        let tone = Delivery::from_result("Tone", self.tone.play(&Tone::default()));
        let speech = Delivery::from_result("Speech", self.speech.speak(&announcement_text(level)));

        let notification = if self.constrained || self.notifier.permission() != Permission::Granted {
            Delivery::Skipped
        } else {
            Delivery::from_result(
                "Notification",
                self.notifier
                    .show(defaults::NOTIFICATION_TITLE, &notification_body(level)),
            )
        };

        FanoutReport {
            tone,
            speech,
            notification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        fail: bool,
        permission: Cell<Option<Permission>>,
        answer: Option<Permission>,
    }

    impl Recorder {
        fn failing() -> Rc<Self> {
            Rc::new(Self {
                fail: true,
                ..Default::default()
            })
        }

        fn with_permission(permission: Permission, answer: Permission) -> Rc<Self> {
            Rc::new(Self {
                permission: Cell::new(Some(permission)),
                answer: Some(answer),
                ..Default::default()
            })
        }

        fn record(&self, call: String) -> Result<(), PlatformError> {
            self.calls.borrow_mut().push(call);
            if self.fail {
                Err(PlatformError::Js("boom".to_string()))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ToneOutput for Recorder {
        fn prepare(&self) -> Result<(), PlatformError> {
            self.record("prepare".to_string())
        }

        fn play(&self, tone: &Tone) -> Result<(), PlatformError> {
            self.record(format!("tone {}", tone.frequency_hz))
        }
    }

    impl SpeechOutput for Recorder {
        fn prime(&self) -> Result<(), PlatformError> {
            self.record("prime".to_string())
        }

        fn speak(&self, text: &str) -> Result<(), PlatformError> {
            self.record(format!("say {}", text))
        }
    }

    impl SystemNotifier for Recorder {
        fn permission(&self) -> Permission {
            self.permission.get().unwrap_or(Permission::Granted)
        }

        fn request_permission(
            &self,
            on_resolved: Box<dyn FnOnce(Permission)>,
        ) -> Result<(), PlatformError> {
            self.calls.borrow_mut().push("request".to_string());
            let answer = self.answer.unwrap_or(Permission::Denied);
            self.permission.set(Some(answer));
            on_resolved(answer);
            Ok(())
        }

        fn show(&self, title: &str, body: &str) -> Result<(), PlatformError> {
            self.record(format!("{} | {}", title, body))
        }
    }

    const LEVEL: BlindLevel = BlindLevel { small: 10, big: 20 };

    #[test]
    fn fires_every_channel() {
        let tone = Rc::new(Recorder::default());
        let speech = Rc::new(Recorder::default());
        let notifier = Rc::new(Recorder::default());
        let fanout = AlertFanout::new(tone.clone(), speech.clone(), notifier.clone(), false);

        let report = fanout.fire(&LEVEL);
        assert_eq!(report.tone, Delivery::Sent);
        assert_eq!(report.speech, Delivery::Sent);
        assert_eq!(report.notification, Delivery::Sent);
        assert_eq!(tone.calls(), vec!["tone 800"]);
        assert_eq!(speech.calls(), vec!["say Timer expired! New blind level: 10 20"]);
        assert_eq!(
            notifier.calls(),
            vec!["Poker Timer Expired! | New blind level: 10/20"]
        );
    }

    #[test]
    fn failing_channel_does_not_block_others() {
        let speech = Rc::new(Recorder::default());
        let notifier = Rc::new(Recorder::default());
        let fanout = AlertFanout::new(Recorder::failing(), speech.clone(), notifier.clone(), false);

        let report = fanout.fire(&LEVEL);
        assert!(matches!(report.tone, Delivery::Failed(_)));
        assert_eq!(report.speech, Delivery::Sent);
        assert_eq!(report.notification, Delivery::Sent);
        assert_eq!(speech.calls().len(), 1);
        assert_eq!(notifier.calls().len(), 1);
    }

    #[test]
    fn notification_needs_granted_permission() {
        let notifier = Recorder::with_permission(Permission::Denied, Permission::Denied);
        let fanout = AlertFanout::new(Rc::new(Silent), Rc::new(Silent), notifier.clone(), false);
        assert_eq!(fanout.fire(&LEVEL).notification, Delivery::Skipped);
        assert!(notifier.calls().is_empty());
    }

    #[test]
    fn constrained_mode_suppresses_notifications() {
        let notifier = Rc::new(Recorder::default());
        let fanout = AlertFanout::new(Rc::new(Silent), Rc::new(Silent), notifier.clone(), true);
        assert_eq!(fanout.fire(&LEVEL).notification, Delivery::Skipped);

        fanout.prepare_on_user_gesture(|_| {});
        assert!(notifier.calls().is_empty());
    }

    #[test]
    fn first_gesture_requests_permission_once_and_primes_once() {
        let tone = Rc::new(Recorder::default());
        let speech = Rc::new(Recorder::default());
        let notifier = Recorder::with_permission(Permission::Default, Permission::Granted);
        let fanout = AlertFanout::new(tone.clone(), speech.clone(), notifier.clone(), false);

        let resolved = Rc::new(Cell::new(None));
        let sink = resolved.clone();
        fanout.prepare_on_user_gesture(move |p| sink.set(Some(p)));
        fanout.prepare_on_user_gesture(|_| panic!("asked twice"));

        assert_eq!(resolved.get(), Some(Permission::Granted));
        assert_eq!(notifier.calls(), vec!["request"]);
        assert_eq!(speech.calls(), vec!["prime"]);
        assert_eq!(tone.calls(), vec!["prepare", "prepare"]);
        assert_eq!(fanout.fire(&LEVEL).notification, Delivery::Sent);
    }

    #[test]
    fn dismissed_prompt_is_not_repeated() {
        // The user closed the prompt without answering: still Default.
        let notifier = Recorder::with_permission(Permission::Default, Permission::Default);
        let fanout = AlertFanout::new(Rc::new(Silent), Rc::new(Silent), notifier.clone(), false);
        fanout.prepare_on_user_gesture(|_| {});
        fanout.prepare_on_user_gesture(|_| {});
        assert_eq!(notifier.calls(), vec!["request"]);
    }

    #[test]
    fn explicit_request_only_while_undecided() {
        let notifier = Recorder::with_permission(Permission::Denied, Permission::Granted);
        let fanout = AlertFanout::new(Rc::new(Silent), Rc::new(Silent), notifier.clone(), false);
        fanout.request_permission(|_| panic!("should not ask"));
        assert!(notifier.calls().is_empty());
    }

    #[test]
    fn silent_fanout_reports_sent_and_skipped() {
        let report = AlertFanout::silent().fire(&LEVEL);
        assert_eq!(report.tone, Delivery::Sent);
        assert_eq!(report.speech, Delivery::Sent);
        assert_eq!(report.notification, Delivery::Skipped);
    }
}
