//! Pure Yew view components for the timer screen.
//!
//! This module contains stateless components that render based on props;
//! all state lives in the clock handle owned by the main component.

use poker_timer::alerts::Permission;
use poker_timer::{BlindLevel, LevelField};
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Remaining time and level counter.
#[derive(Properties, PartialEq)]
pub struct TimerFaceProps {
    pub remaining: AttrValue,
    pub level_number: usize,
    pub level_count: usize,
}

#[function_component(TimerFace)]
pub fn timer_face(props: &TimerFaceProps) -> Html {
    html! {
        <div class="timer-face">
            <h1>{ crate::config::APP_TITLE }</h1>
            <div class="time-remaining">{ props.remaining.clone() }</div>
            <div class="level-counter">
                { format!("Level {} of {}", props.level_number, props.level_count) }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct BlindDisplayProps {
    pub current: BlindLevel,
    pub upcoming: Option<BlindLevel>,
}

#[function_component(BlindDisplay)]
pub fn blind_display(props: &BlindDisplayProps) -> Html {
    html! {
        <div class="blind-display">
            <div class="blind-label">{ "Current Blinds" }</div>
            <div class="blind-current">{ props.current.to_string() }</div>
            if let Some(next) = props.upcoming {
                <div class="blind-next">{ format!("Next: {}", next) }</div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TimerControlsProps {
    pub running: bool,
    pub on_toggle: Callback<()>,
    pub on_reset: Callback<()>,
    pub on_settings: Callback<()>,
}

#[function_component(TimerControls)]
pub fn timer_controls(props: &TimerControlsProps) -> Html {
    html! {
        <div class="timer-controls">
            <button class="btn-round btn-primary"
                aria-label={ if props.running { "Pause" } else { "Start" } }
                onclick={props.on_toggle.reform(|_| ())}
            >
                { if props.running { "❚❚" } else { "▶" } }
            </button>
            <button class="btn-round btn-secondary" aria-label="Reset"
                onclick={props.on_reset.reform(|_| ())}
            >
                { "↺" }
            </button>
            <button class="btn-round btn-settings" aria-label="Settings"
                onclick={props.on_settings.reform(|_| ())}
            >
                { "⚙" }
            </button>
        </div>
    }
}

/// Previous/next blind level buttons.
#[derive(Properties, PartialEq)]
pub struct LevelNavigatorProps {
    pub at_first: bool,
    pub at_last: bool,
    pub on_previous: Callback<()>,
    pub on_next: Callback<()>,
}

#[function_component(LevelNavigator)]
pub fn level_navigator(props: &LevelNavigatorProps) -> Html {
    html! {
        <div class="level-navigator">
            <button class="btn-round btn-nav" aria-label="Previous level"
                disabled={props.at_first}
                onclick={props.on_previous.reform(|_| ())}
            >
                { "‹" }
            </button>
            <span class="level-navigator-label">{ "Blind Level" }</span>
            <button class="btn-round btn-nav" aria-label="Next level"
                disabled={props.at_last}
                onclick={props.on_next.reform(|_| ())}
            >
                { "›" }
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProgressBarProps {
    /// Elapsed fraction of the level, 0.0 to 1.0.
    pub progress: f64,
}

#[function_component(ProgressBar)]
pub fn progress_bar(props: &ProgressBarProps) -> Html {
    let width = (props.progress.clamp(0.0, 1.0) * 100.0).round();
    html! {
        <div class="progress-track">
            <div class="progress-fill" style={format!("width: {}%", width)}></div>
        </div>
    }
}

/// One-time hint for browsers that need the app installed for notifications.
#[derive(Properties, PartialEq)]
pub struct InstallHintProps {
    pub on_dismiss: Callback<()>,
}

#[function_component(InstallHint)]
pub fn install_hint(props: &InstallHintProps) -> Html {
    html! {
        <div class="install-hint" role="status">
            <span>{ crate::config::INSTALL_HINT }</span>
            <button class="btn-link" onclick={props.on_dismiss.reform(|_| ())}>
                { "Got it" }
            </button>
        </div>
    }
}

/// Level duration form plus the notification prompt.
#[derive(Properties, PartialEq)]
pub struct TimerSettingsProps {
    pub minutes_text: AttrValue,
    pub seconds_text: AttrValue,
    pub on_minutes_input: Callback<InputEvent>,
    pub on_seconds_input: Callback<InputEvent>,
    pub on_apply: Callback<()>,
    pub editor_open: bool,
    pub on_toggle_editor: Callback<()>,
    pub permission: Permission,
    pub on_enable_notifications: Callback<()>,
}

#[function_component(TimerSettings)]
pub fn timer_settings(props: &TimerSettingsProps) -> Html {
    html! {
        <div class="settings-panel">
            <h3>{ "Timer Settings" }</h3>
            <div class="form-row">
                <div class="form-group">
                    <label for="minutes_input">{ "Minutes" }</label>
                    <input type="number" id="minutes_input"
                        min="0" max={crate::config::MAX_FORM_MINUTES.to_string()}
                        value={props.minutes_text.clone()}
                        oninput={props.on_minutes_input.clone()}
                    />
                </div>
                <div class="form-group">
                    <label for="seconds_input">{ "Seconds" }</label>
                    <input type="number" id="seconds_input"
                        min="0" max={crate::config::MAX_FORM_SECONDS.to_string()}
                        value={props.seconds_text.clone()}
                        oninput={props.on_seconds_input.clone()}
                    />
                </div>
            </div>
            <button class="btn-block btn-primary" onclick={props.on_apply.reform(|_| ())}>
                { "Apply Timer Duration" }
            </button>
            <button class="btn-block btn-accent" onclick={props.on_toggle_editor.reform(|_| ())}>
                { if props.editor_open { "Hide Blind Levels" } else { "Customize Blind Levels" } }
            </button>

            // Only offered while the browser has not decided yet
            if props.permission == Permission::Default {
                <div class="notification-prompt">
                    <span>{ "Enable notifications for timer alerts" }</span>
                    <button class="btn-small btn-warning"
                        onclick={props.on_enable_notifications.reform(|_| ())}
                    >
                        { "Enable Notifications" }
                    </button>
                </div>
            }
        </div>
    }
}

/// Editable copy of the blind structure.
#[derive(Properties, PartialEq)]
pub struct LevelEditorProps {
    pub draft: Rc<Vec<BlindLevel>>,
    pub on_append: Callback<()>,
    pub on_remove: Callback<usize>,
    pub on_update: Callback<(usize, LevelField, String)>,
    pub on_apply: Callback<()>,
    pub on_reset_default: Callback<()>,
}

#[function_component(LevelEditor)]
pub fn level_editor(props: &LevelEditorProps) -> Html {
    let removable = props.draft.len() > 1;

    html! {
        <div class="level-editor">
            <div class="level-editor-header">
                <h3>{ "Blind Levels" }</h3>
                <div class="level-editor-actions">
                    <button class="btn-small btn-secondary"
                        onclick={props.on_reset_default.reform(|_| ())}
                    >
                        { "Reset to Default" }
                    </button>
                    <button class="btn-small btn-success" onclick={props.on_append.reform(|_| ())}>
                        { "Add Level" }
                    </button>
                </div>
            </div>
            <div class="level-rows">
                { props.draft.iter().enumerate().map(|(idx, level)| {
                    render_level_row(idx, level, removable, &props.on_update, &props.on_remove)
                }).collect::<Html>() }
            </div>
            <button class="btn-block btn-accent" onclick={props.on_apply.reform(|_| ())}>
                { "Apply Blind Levels" }
            </button>
        </div>
    }
}

fn level_input(
    idx: usize,
    field: LevelField,
    value: u32,
    on_update: &Callback<(usize, LevelField, String)>,
) -> Html {
    let on_update = on_update.clone();
    html! {
        <input type="number" min="1" class="level-input"
            value={value.to_string()}
            oninput={Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                on_update.emit((idx, field, input.value()));
            })}
        />
    }
}

/// Renders a single editable level row
fn render_level_row(
    idx: usize,
    level: &BlindLevel,
    removable: bool,
    on_update: &Callback<(usize, LevelField, String)>,
    on_remove: &Callback<usize>,
) -> Html {
    html! {
        <div class="level-row" key={idx.to_string()}>
            <span class="level-row-number">{ format!("{}.", idx + 1) }</span>
            { level_input(idx, LevelField::Small, level.small, on_update) }
            <span class="level-row-separator">{ "/" }</span>
            { level_input(idx, LevelField::Big, level.big, on_update) }
            if removable {
                <button class="btn-remove" aria-label="Remove level"
                    onclick={on_remove.reform(move |_| idx)}
                >
                    { "×" }
                </button>
            }
        </div>
    }
}
