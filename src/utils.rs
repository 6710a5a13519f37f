use once_cell::sync::Lazy;
use poker_timer::defaults::FALLBACK_LANGUAGE;
use regex::Regex;
use wasm_bindgen::JsValue;

// Compiled regexes for user-agent sniffing
static IOS_DEVICE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"iPad|iPhone|iPod").unwrap());
static SAFARI_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)safari").unwrap());
static OTHER_ENGINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)chrome|android").unwrap());

/// iOS Safari running in a normal tab rather than from the home screen.
/// Such a page cannot show system notifications.
pub fn is_constrained_ios(user_agent: &str, standalone: bool) -> bool {
    let is_ios = IOS_DEVICE_REGEX.is_match(user_agent);
    let is_safari = SAFARI_REGEX.is_match(user_agent) && !OTHER_ENGINE_REGEX.is_match(user_agent);
    is_ios && is_safari && !standalone
}

/// What the page learned about its browser at mount.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub language: String,
    pub constrained: bool,
}

impl Environment {
    pub fn detect() -> Self {
        let navigator = gloo_utils::window().navigator();
        let user_agent = navigator.user_agent().unwrap_or_default();
        // Non-standard, only present on iOS
        let standalone = js_sys::Reflect::get(&navigator, &JsValue::from_str("standalone"))
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        Self {
            language: navigator
                .language()
                .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string()),
            constrained: is_constrained_ios(&user_agent, standalone),
        }
    }
}

/// Total level length from the minutes and seconds fields.
pub fn duration_from_form(minutes: u32, seconds: u32) -> u32 {
    minutes.saturating_mul(60).saturating_add(seconds)
}
