use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use wasm_bindgen::prelude::*;

pub mod alerts;
pub mod logging;
pub mod platform;
pub mod timer;

/// Default timer and alert parameters
pub mod defaults {
    /// Level length on first mount, in seconds.
    pub const DURATION_SECS: u32 = 5;

    /// Row appended by the level editor.
    pub const APPENDED_SMALL_BLIND: u32 = 10;

    // Expiry tone
    pub const TONE_FREQUENCY_HZ: f32 = 800.0;
    pub const TONE_START_GAIN: f32 = 0.5;
    pub const TONE_END_GAIN: f32 = 0.01;
    pub const TONE_DURATION_SECS: f64 = 1.0;

    // Voice list wait
    pub const VOICE_POLL_INTERVAL_MS: u32 = 100;
    pub const VOICE_POLL_MAX_TRIES: u32 = 10;
    pub const FALLBACK_LANGUAGE: &str = "en";

    // System notification
    pub const NOTIFICATION_TITLE: &str = "Poker Timer Expired!";
    pub const NOTIFICATION_ICON: &str = "/favicon.ico";
}

/// One row of the blind structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlindLevel {
    pub small: u32,
    pub big: u32,
}

impl BlindLevel {
    /// Level with the conventional big blind of twice the small blind.
    pub fn from_small(small: u32) -> Self {
        Self {
            small,
            big: small * 2,
        }
    }
}

impl Default for BlindLevel {
    fn default() -> Self {
        Self::from_small(defaults::APPENDED_SMALL_BLIND)
    }
}

impl fmt::Display for BlindLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.small, self.big)
    }
}

/// Which half of a blind level an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelField {
    Small,
    Big,
}

// Errors raised by the level editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelEditError {
    /// The table must keep at least one row.
    LastLevel,
    OutOfRange { index: usize, len: usize },
}

impl fmt::Display for LevelEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelEditError::LastLevel => write!(f, "Cannot remove the last remaining blind level"),
            LevelEditError::OutOfRange { index, len } => write!(
                f,
                "Blind level {} does not exist (table has {} levels)",
                index + 1,
                len
            ),
        }
    }
}

impl std::error::Error for LevelEditError {}

/// Small-blind bands of the default structure: (first, last, step), inclusive.
const BLIND_BANDS: [(u32, u32, u32); 4] = [(5, 30, 5), (40, 100, 10), (125, 250, 25), (300, 800, 50)];

/// Build the default blind structure.
///
/// The small blind climbs by a fixed step inside each band and the big blind is
/// always twice the small blind. The result is the same on every call, so
/// resetting to it is idempotent.
pub fn generate_blind_levels() -> Vec<BlindLevel> {
    let levels: Vec<BlindLevel> = BLIND_BANDS
        .iter()
        .flat_map(|&(first, last, step)| (first..=last).step_by(step as usize))
        .map(BlindLevel::from_small)
        .collect();
    debug!("Generated {} default blind levels", levels.len());
    levels
}

/// Format whole seconds as `mm:ss`.
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse the leading integer of a form value, the way a browser number field
/// is read: surrounding whitespace is ignored and trailing junk is dropped.
fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Values too long for i64 saturate instead of failing
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

/// Coerce a form value to a positive integer; anything unusable becomes 1.
pub fn coerce_positive(input: &str) -> u32 {
    match parse_leading_int(input) {
        Some(v) if v >= 1 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Coerce a form value to a non-negative integer; anything unusable becomes 0.
pub fn coerce_non_negative(input: &str) -> u32 {
    match parse_leading_int(input) {
        Some(v) if v >= 0 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => 0,
    }
}

/// Default blind structure for host pages that render it themselves.
///
/// Returns an array of `{ small, big }` objects.
#[wasm_bindgen]
pub fn default_blind_levels() -> JsValue {
    serde_wasm_bindgen::to_value(&generate_blind_levels()).unwrap_or(JsValue::NULL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_structure_is_ascending_with_double_big_blind() {
        let levels = generate_blind_levels();
        assert_eq!(levels.len(), 30);
        assert_eq!(levels[0], BlindLevel { small: 5, big: 10 });
        assert_eq!(levels[1], BlindLevel { small: 10, big: 20 });
        assert_eq!(levels.last(), Some(&BlindLevel { small: 800, big: 1600 }));
        for pair in levels.windows(2) {
            assert!(pair[0].small < pair[1].small, "{:?} not ascending", pair);
        }
        assert!(levels.iter().all(|l| l.big == l.small * 2));
    }

    #[test]
    fn default_structure_is_deterministic() {
        assert_eq!(generate_blind_levels(), generate_blind_levels());
    }

    #[test]
    fn band_boundaries_are_included() {
        let smalls: Vec<u32> = generate_blind_levels().iter().map(|l| l.small).collect();
        for boundary in [30, 40, 100, 125, 250, 300, 800] {
            assert!(smalls.contains(&boundary), "missing {}", boundary);
        }
        assert!(!smalls.contains(&35));
        assert!(!smalls.contains(&110));
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(5), "00:05");
        assert_eq!(format_mm_ss(90), "01:30");
        assert_eq!(format_mm_ss(15 * 60), "15:00");
        assert_eq!(format_mm_ss(125 * 60 + 7), "125:07");
    }

    #[test]
    fn positive_coercion_falls_back_to_one() {
        assert_eq!(coerce_positive("25"), 25);
        assert_eq!(coerce_positive(" 40 "), 40);
        assert_eq!(coerce_positive("12abc"), 12);
        assert_eq!(coerce_positive(""), 1);
        assert_eq!(coerce_positive("abc"), 1);
        assert_eq!(coerce_positive("0"), 1);
        assert_eq!(coerce_positive("-7"), 1);
        assert_eq!(coerce_positive("99999999999999999999"), u32::MAX);
    }

    #[test]
    fn non_negative_coercion_falls_back_to_zero() {
        assert_eq!(coerce_non_negative("0"), 0);
        assert_eq!(coerce_non_negative("30"), 30);
        assert_eq!(coerce_non_negative("x"), 0);
        assert_eq!(coerce_non_negative("-2"), 0);
    }

    #[test]
    fn edit_errors_read_naturally() {
        assert_eq!(
            LevelEditError::OutOfRange { index: 4, len: 3 }.to_string(),
            "Blind level 5 does not exist (table has 3 levels)"
        );
        assert_eq!(BlindLevel::from_small(25).to_string(), "25 / 50");
    }
}
