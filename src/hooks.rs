use crate::config::TICK_MS;
use crate::utils::Environment;
use gloo_timers::callback::Interval;
use log::debug;
use poker_timer::alerts::{AlertFanout, Permission};
use poker_timer::platform::web_alerts;
use poker_timer::timer::{PokerClock, Tick};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Holds the state and callback for a numeric field that never rejects input.
#[derive(Clone)]
pub struct CoercedInput {
    /// The current text content of the input field.
    pub text: String,
    /// The coerced value of `text`.
    pub value: u32,
    /// Callback for the field's `oninput` event.
    pub on_input: Callback<InputEvent>,
}

/// Custom hook for a number field whose text is coerced instead of validated.
#[hook]
pub fn use_coerced_input(initial_value: u32, coerce: fn(&str) -> u32) -> CoercedInput {
    let text_state_handle = use_state(|| initial_value.to_string());

    let on_input = {
        let text_setter = text_state_handle.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_setter.set(input.value());
        })
    };

    CoercedInput {
        text: (*text_state_handle).clone(),
        value: coerce(&text_state_handle),
        on_input,
    }
}

/// Shared handle to the tournament clock and its alert fan-out.
#[derive(Clone)]
pub struct ClockHandle {
    clock: Rc<RefCell<PokerClock>>,
    alerts: Rc<AlertFanout>,
    permission: UseStateHandle<Permission>,
    rerender: UseForceUpdateHandle,
}

impl ClockHandle {
    pub fn read(&self) -> Ref<'_, PokerClock> {
        self.clock.borrow()
    }

    /// Mutate the clock and re-render.
    pub fn update(&self, f: impl FnOnce(&mut PokerClock)) {
        f(&mut self.clock.borrow_mut());
        self.rerender.force_update();
    }

    /// Start/pause button. Runs the gesture-bound alert setup first.
    pub fn toggle(&self) {
        let permission = self.permission.clone();
        self.alerts
            .prepare_on_user_gesture(move |resolved| permission.set(resolved));
        self.update(|clock| {
            clock.toggle();
        });
    }

    pub fn request_notifications(&self) {
        let permission = self.permission.clone();
        self.alerts
            .request_permission(move |resolved| permission.set(resolved));
    }

    pub fn permission(&self) -> Permission {
        *self.permission
    }

    pub fn is_constrained(&self) -> bool {
        self.alerts.is_constrained()
    }
}

/// Owns the clock for the lifetime of the component and drives its
/// one-second tick while it is running.
#[hook]
pub fn use_poker_clock(environment: Environment) -> ClockHandle {
    let clock = use_mut_ref(PokerClock::default);
    let alerts = use_memo(environment, |env| web_alerts(&env.language, env.constrained));
    let permission = {
        let alerts = alerts.clone();
        use_state(move || alerts.permission())
    };
    let rerender = use_force_update();

    // The interval only lives while running; dropping it cancels the pending tick.
    let running = clock.borrow().is_running();
    {
        let clock = clock.clone();
        let alerts = alerts.clone();
        let rerender = rerender.clone();
        use_effect_with(running, move |&running| {
            let interval = running.then(|| {
                Interval::new(TICK_MS, move || {
                    let tick = clock.borrow_mut().tick();
                    if let Tick::Expired { level, level_index } = tick {
                        let report = alerts.fire(&level);
                        debug!("Level {} alerts: {:?}", level_index + 1, report);
                    }
                    rerender.force_update();
                })
            });
            move || drop(interval)
        });
    }

    ClockHandle {
        clock,
        alerts,
        permission,
        rerender,
    }
}
