//! Application-level configuration constants.

use log::LevelFilter;

// Timer
pub const TICK_MS: u32 = 1000;

// Default values for the duration form
pub const DEFAULT_CUSTOM_MINUTES: u32 = 15;
pub const DEFAULT_CUSTOM_SECONDS: u32 = 0;
pub const MAX_FORM_MINUTES: u32 = 59;
pub const MAX_FORM_SECONDS: u32 = 59;

// Logging
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

// UI text
pub const APP_TITLE: &str = "Poker Timer";
pub const INSTALL_HINT: &str =
    "To enable notifications on iOS, add this app to your Home Screen and launch it from there.";
