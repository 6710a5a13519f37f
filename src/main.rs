//! Main module for the Poker Timer application using Yew.
//! Wires the clock hook, view components and settings state.

use log::{debug, info, warn};
use poker_timer::timer::PokerClock;
use poker_timer::{coerce_non_negative, logging, LevelField};
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod config;
mod hooks;
mod utils;

use components::{
    BlindDisplay, InstallHint, LevelEditor, LevelNavigator, ProgressBar, TimerControls,
    TimerFace, TimerSettings,
};
use config::*;
use hooks::{use_coerced_input, use_poker_clock, ClockHandle};
use utils::{duration_from_form, Environment};

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Callback that mutates the clock and ignores its argument.
fn clock_action(clock: &ClockHandle, action: fn(&mut PokerClock)) -> Callback<()> {
    let clock = clock.clone();
    Callback::from(move |_: ()| clock.update(action))
}

fn background_style(rgb: (u8, u8, u8)) -> String {
    let (r, g, b) = rgb;
    format!("background-color: rgb({r}, {g}, {b})")
}

// ──────────────────────────────────────────────────────────────────────────────

/// Timer screen: face, blinds, controls and the collapsible settings.
#[function_component(PokerTimer)]
fn timer_screen() -> Html {
    let environment = (*use_memo((), |_| Environment::detect())).clone();
    let show_install_hint = use_state(|| environment.constrained);
    let clock = use_poker_clock(environment);

    let settings_visible = use_state(|| false);
    let editor_visible = use_state(|| false);
    let minutes = use_coerced_input(DEFAULT_CUSTOM_MINUTES, coerce_non_negative);
    let seconds = use_coerced_input(DEFAULT_CUSTOM_SECONDS, coerce_non_negative);

    // --- Timer controls ---
    let on_toggle = {
        let clock = clock.clone();
        Callback::from(move |_: ()| clock.toggle())
    };
    let on_reset = clock_action(&clock, |c| c.reset());
    let on_previous = clock_action(&clock, |c| c.previous_level());
    let on_next = clock_action(&clock, |c| c.next_level());

    let on_settings = {
        let settings_visible = settings_visible.clone();
        let editor_visible = editor_visible.clone();
        Callback::from(move |_: ()| {
            // Closing the settings also closes the level editor
            if *settings_visible {
                editor_visible.set(false);
            }
            settings_visible.set(!*settings_visible);
        })
    };

    let on_apply_duration = {
        let clock = clock.clone();
        let settings_visible = settings_visible.clone();
        let editor_visible = editor_visible.clone();
        let total = duration_from_form(minutes.value, seconds.value);
        Callback::from(move |_: ()| {
            clock.update(|c| c.set_duration(total));
            settings_visible.set(false);
            editor_visible.set(false);
        })
    };

    let on_toggle_editor = {
        let editor_visible = editor_visible.clone();
        Callback::from(move |_: ()| editor_visible.set(!*editor_visible))
    };

    let on_enable_notifications = {
        let clock = clock.clone();
        Callback::from(move |_: ()| clock.request_notifications())
    };

    // --- Level editor ---
    let on_append = clock_action(&clock, |c| c.append_level());

    let on_remove = {
        let clock = clock.clone();
        Callback::from(move |idx: usize| {
            clock.update(|c| {
                if let Err(e) = c.remove_level(idx) {
                    debug!("Remove refused: {}", e);
                }
            })
        })
    };

    let on_update = {
        let clock = clock.clone();
        Callback::from(move |(idx, field, raw): (usize, LevelField, String)| {
            clock.update(|c| {
                if let Err(e) = c.update_level(idx, field, &raw) {
                    warn!("Level edit ignored: {}", e);
                }
            })
        })
    };

    let on_apply_levels = {
        let clock = clock.clone();
        let editor_visible = editor_visible.clone();
        Callback::from(move |_: ()| {
            clock.update(|c| c.apply_draft());
            editor_visible.set(false);
        })
    };

    let on_reset_default = clock_action(&clock, |c| c.reset_to_default());

    let on_dismiss_hint = {
        let show_install_hint = show_install_hint.clone();
        Callback::from(move |_: ()| show_install_hint.set(false))
    };

    // Snapshot for rendering; the borrow ends before any callback can run.
    let view = clock.read();
    let draft = Rc::new(view.draft().to_vec());

    html! {
        <div class="page" style={background_style(view.background_rgb())}>
            <div class="card">
                if *show_install_hint {
                    <InstallHint on_dismiss={on_dismiss_hint} />
                }

                <TimerFace
                    remaining={view.remaining_display()}
                    level_number={view.level_index() + 1}
                    level_count={view.level_count()}
                />

                <BlindDisplay current={view.current_level()} upcoming={view.upcoming_level()} />

                <TimerControls
                    running={view.is_running()}
                    {on_toggle}
                    {on_reset}
                    {on_settings}
                />

                <LevelNavigator
                    at_first={view.is_first_level()}
                    at_last={view.is_last_level()}
                    {on_previous}
                    {on_next}
                />

                if *settings_visible {
                    <TimerSettings
                        minutes_text={minutes.text.clone()}
                        seconds_text={seconds.text.clone()}
                        on_minutes_input={minutes.on_input.clone()}
                        on_seconds_input={seconds.on_input.clone()}
                        on_apply={on_apply_duration}
                        editor_open={*editor_visible}
                        {on_toggle_editor}
                        permission={clock.permission()}
                        {on_enable_notifications}
                    />
                }

                if *editor_visible {
                    <LevelEditor
                        {draft}
                        {on_append}
                        {on_remove}
                        {on_update}
                        on_apply={on_apply_levels}
                        {on_reset_default}
                    />
                }

                <ProgressBar progress={view.countdown().progress()} />
            </div>
        </div>
    }
}

/// Entry point: installs logging and renders the timer.
fn main() {
    console_error_panic_hook::set_once();
    if logging::init(LOG_LEVEL).is_ok() {
        info!("Poker timer starting");
    }
    yew::Renderer::<PokerTimer>::new().render();
}
