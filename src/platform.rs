//! Browser implementations of the alert capabilities.
//!
//! Feature detection happens once in [`web_alerts`]; any API the page lacks is
//! replaced by [`Silent`] so the rest of the app never checks for it again.

use crate::alerts::{
    AlertFanout, Permission, PlatformError, Silent, SpeechOutput, SystemNotifier, Tone, ToneOutput,
};
use crate::defaults;
use gloo_timers::callback::{Interval, Timeout};
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AudioContext, AudioContextState, AudioScheduledSourceNode, Notification, NotificationOptions,
    NotificationPermission, OscillatorType, SpeechSynthesis, SpeechSynthesisUtterance,
    SpeechSynthesisVoice, Window,
};

impl From<JsValue> for PlatformError {
    fn from(value: JsValue) -> Self {
        PlatformError::Js(
            value
                .as_string()
                .or_else(|| {
                    value
                        .dyn_ref::<js_sys::Error>()
                        .map(|e| String::from(e.message()))
                })
                .unwrap_or_else(|| format!("{:?}", value)),
        )
    }
}

fn has_global(window: &Window, name: &str) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str(name)).unwrap_or(false)
}

/// Build the alert fan-out from whatever the current page supports.
///
/// `language` is the user's locale (e.g. `en-US`); `constrained` marks a
/// browser that cannot show foreground notifications.
pub fn web_alerts(language: &str, constrained: bool) -> AlertFanout {
    let Some(window) = web_sys::window() else {
        warn!("No window object, alerts disabled");
        return AlertFanout::silent();
    };

    let tone: Rc<dyn ToneOutput> =
        if has_global(&window, "AudioContext") || has_global(&window, "webkitAudioContext") {
            Rc::new(WebTone::default())
        } else {
            debug!("Web Audio unsupported");
            Rc::new(Silent)
        };

    let speech: Rc<dyn SpeechOutput> = match window.speech_synthesis() {
        Ok(synth) => Rc::new(WebSpeech::new(synth, language)),
        Err(_) => {
            debug!("Speech synthesis unsupported");
            Rc::new(Silent)
        }
    };

    let notifier: Rc<dyn SystemNotifier> = if has_global(&window, "Notification") {
        Rc::new(WebNotifier)
    } else {
        debug!("Notifications unsupported");
        Rc::new(Silent)
    };

    AlertFanout::new(tone, speech, notifier, constrained)
}

// ──────────────────────────────────────────────────────────────────────────────
// Tone

/// Web Audio tone generator. The context is created on the first user gesture.
#[derive(Default)]
pub struct WebTone {
    context: RefCell<Option<AudioContext>>,
}

impl WebTone {
    fn resume_if_suspended(context: &AudioContext) -> Result<(), PlatformError> {
        if context.state() == AudioContextState::Suspended {
            // The promise settles on its own; nothing waits for it.
            let _ = context.resume()?;
        }
        Ok(())
    }
}

impl ToneOutput for WebTone {
    fn prepare(&self) -> Result<(), PlatformError> {
        let mut slot = self.context.borrow_mut();
        if slot.is_none() {
            *slot = Some(AudioContext::new()?);
            debug!("Audio context created");
        }
        match slot.as_ref() {
            Some(context) => Self::resume_if_suspended(context),
            None => Err(PlatformError::Unavailable("audio context")),
        }
    }

    fn play(&self, tone: &Tone) -> Result<(), PlatformError> {
        let slot = self.context.borrow();
        let context = slot
            .as_ref()
            .ok_or(PlatformError::Unavailable("audio context"))?;
        Self::resume_if_suspended(context)?;

        let oscillator = context.create_oscillator()?;
        let gain = context.create_gain()?;
        oscillator.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&context.destination())?;

        let now = context.current_time();
        let end = now + tone.duration_secs;
        oscillator.set_type(OscillatorType::Sine);
        oscillator.frequency().set_value(tone.frequency_hz);
        gain.gain().set_value_at_time(tone.start_gain, now)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(tone.end_gain, end)?;

        let source: &AudioScheduledSourceNode = oscillator.as_ref();
        source.start_with_when(now)?;
        source.stop_with_when(end)?;
        Ok(())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Speech

/// Index of the voice to use: the first whose language starts with
/// `language_prefix`, otherwise the first voice.
pub fn pick_voice<'a>(
    voice_langs: impl IntoIterator<Item = &'a str>,
    language_prefix: &str,
) -> Option<usize> {
    let prefix = language_prefix.to_ascii_lowercase();
    let mut any = None;
    for (i, lang) in voice_langs.into_iter().enumerate() {
        any.get_or_insert(i);
        if lang.to_ascii_lowercase().starts_with(&prefix) {
            return Some(i);
        }
    }
    any
}

/// Primary subtag of a locale: `"en-US"` → `"en"`.
pub fn language_prefix(language: &str) -> &str {
    let primary = language.split(['-', '_']).next().unwrap_or_default().trim();
    if primary.is_empty() {
        defaults::FALLBACK_LANGUAGE
    } else {
        primary
    }
}

/// Speech synthesis that waits for the voice list before speaking.
pub struct WebSpeech {
    synth: SpeechSynthesis,
    language_prefix: String,
}

impl WebSpeech {
    pub fn new(synth: SpeechSynthesis, language: &str) -> Self {
        Self {
            synth,
            language_prefix: language_prefix(language).to_string(),
        }
    }

    fn voices(synth: &SpeechSynthesis) -> Vec<SpeechSynthesisVoice> {
        synth
            .get_voices()
            .iter()
            .filter_map(|v| v.dyn_into::<SpeechSynthesisVoice>().ok())
            .collect()
    }

    fn speak_now(
        synth: &SpeechSynthesis,
        language_prefix: &str,
        text: &str,
    ) -> Result<(), PlatformError> {
        let utterance = SpeechSynthesisUtterance::new_with_text(text)?;
        let voices = Self::voices(synth);
        let langs: Vec<String> = voices.iter().map(|v| v.lang()).collect();
        if let Some(voice) =
            pick_voice(langs.iter().map(String::as_str), language_prefix).and_then(|i| voices.get(i))
        {
            utterance.set_voice(Some(voice));
        }
        synth.speak(&utterance);
        Ok(())
    }

    /// Speak once the voice list is populated: on `voiceschanged`, or after a
    /// bounded poll, whichever comes first.
    fn speak_when_ready(&self, text: &str) {
        let spoken = Rc::new(Cell::new(false));
        let poll: Rc<RefCell<Option<Interval>>> = Rc::new(RefCell::new(None));

        let say: Rc<dyn Fn()> = {
            let synth = self.synth.clone();
            let prefix = self.language_prefix.clone();
            let text = text.to_string();
            let spoken = spoken.clone();
            let poll = poll.clone();
            Rc::new(move || {
                if spoken.replace(true) {
                    return;
                }
                synth.set_onvoiceschanged(None);
                // The poll may be the caller, so it is dropped on the next turn
                if let Some(interval) = poll.borrow_mut().take() {
                    Timeout::new(0, move || drop(interval)).forget();
                }
                if let Err(e) = Self::speak_now(&synth, &prefix, &text) {
                    warn!("Announcement failed: {}", e);
                }
            })
        };

        let on_ready = {
            let say = say.clone();
            Closure::once_into_js(move || say())
        };
        self.synth
            .set_onvoiceschanged(Some(on_ready.unchecked_ref::<js_sys::Function>()));

        let tries = Cell::new(0u32);
        let synth = self.synth.clone();
        let interval = Interval::new(defaults::VOICE_POLL_INTERVAL_MS, move || {
            let attempt = tries.get() + 1;
            tries.set(attempt);
            if synth.get_voices().length() > 0 || attempt >= defaults::VOICE_POLL_MAX_TRIES {
                if attempt >= defaults::VOICE_POLL_MAX_TRIES {
                    debug!("Voice list still empty, speaking with default voice");
                }
                say();
            }
        });
        *poll.borrow_mut() = Some(interval);
    }
}

impl SpeechOutput for WebSpeech {
    fn prime(&self) -> Result<(), PlatformError> {
        let utterance = SpeechSynthesisUtterance::new_with_text(" ")?;
        utterance.set_volume(0.0);
        self.synth.speak(&utterance);
        Ok(())
    }

    fn speak(&self, text: &str) -> Result<(), PlatformError> {
        if self.synth.get_voices().length() > 0 {
            Self::speak_now(&self.synth, &self.language_prefix, text)
        } else {
            debug!("Voice list empty, waiting for it");
            self.speak_when_ready(text);
            Ok(())
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Notifications

pub struct WebNotifier;

fn map_permission(permission: NotificationPermission) -> Permission {
    match permission {
        NotificationPermission::Granted => Permission::Granted,
        NotificationPermission::Denied => Permission::Denied,
        _ => Permission::Default,
    }
}

impl SystemNotifier for WebNotifier {
    fn permission(&self) -> Permission {
        map_permission(Notification::permission())
    }

    fn request_permission(
        &self,
        on_resolved: Box<dyn FnOnce(Permission)>,
    ) -> Result<(), PlatformError> {
        let promise = Notification::request_permission()?;
        wasm_bindgen_futures::spawn_local(async move {
            let permission = match JsFuture::from(promise).await {
                Ok(answer) => NotificationPermission::from_js_value(&answer)
                    .map(map_permission)
                    .unwrap_or(Permission::Default),
                Err(e) => {
                    warn!("Permission request rejected: {}", PlatformError::from(e));
                    map_permission(Notification::permission())
                }
            };
            on_resolved(permission);
        });
        Ok(())
    }

    fn show(&self, title: &str, body: &str) -> Result<(), PlatformError> {
        let options = NotificationOptions::new();
        options.set_body(body);
        options.set_icon(defaults::NOTIFICATION_ICON);
        Notification::new_with_options(title, &options)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_voice_matching_language() {
        let langs = ["de-DE", "en-GB", "en-US"];
        assert_eq!(pick_voice(langs, "en"), Some(1));
        assert_eq!(pick_voice(langs, "EN"), Some(1));
    }

    #[test]
    fn falls_back_to_first_voice() {
        assert_eq!(pick_voice(["fr-FR", "de-DE"], "ja"), Some(0));
        assert_eq!(pick_voice(Vec::<&str>::new(), "en"), None);
    }

    #[test]
    fn language_prefix_takes_primary_subtag() {
        assert_eq!(language_prefix("en-US"), "en");
        assert_eq!(language_prefix("pt_BR"), "pt");
        assert_eq!(language_prefix("de"), "de");
        assert_eq!(language_prefix(""), "en");
    }
}
