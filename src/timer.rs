//! Countdown engine and blind-level bookkeeping.
//!
//! [`PokerClock`] owns everything the timer screen shows: the countdown, the
//! active level table with its current index, and the draft table edited in
//! the settings panel. It has no knowledge of the browser; the caller drives
//! [`PokerClock::tick`] once per second and fans out alerts when a tick
//! reports [`Tick::Expired`].

use crate::{
    coerce_positive, defaults, format_mm_ss, generate_blind_levels, BlindLevel, LevelEditError,
    LevelField,
};
use log::{debug, info};

/// Outcome of a single one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Paused, or nothing to count down.
    Idle,
    /// One second elapsed; the level is still running.
    Counting { remaining: u32 },
    /// The level ran out. `level` is the blind level now in play and the
    /// countdown has already restarted for it.
    Expired { level: BlindLevel, level_index: usize },
}

/// Plain countdown over a configurable duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    /// Returns `false` if the countdown was already running.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.running = false;
    }

    /// Changing the duration always stops the countdown.
    pub fn set_duration(&mut self, seconds: u32) {
        self.duration = seconds;
        self.reset();
    }

    /// Advance one second. Returns `true` when the countdown hit zero; it is
    /// then refilled and keeps running.
    fn tick(&mut self) -> bool {
        if !self.running || self.duration == 0 {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.duration;
            return true;
        }
        false
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Elapsed fraction of the current level in `[0, 1]`; 0 for a zero duration.
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        f64::from(self.duration - self.remaining) / f64::from(self.duration)
    }
}

/// Tournament clock: countdown, active blind table and the draft being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct PokerClock {
    countdown: Countdown,
    levels: Vec<BlindLevel>,
    index: usize,
    draft: Vec<BlindLevel>,
}

impl Default for PokerClock {
    fn default() -> Self {
        Self::new(defaults::DURATION_SECS)
    }
}

impl PokerClock {
    /// Fresh clock on the default blind structure.
    pub fn new(duration: u32) -> Self {
        let levels = generate_blind_levels();
        Self {
            countdown: Countdown::new(duration),
            draft: levels.clone(),
            levels,
            index: 0,
        }
    }

    // ---------- countdown ----------

    pub fn start(&mut self) {
        if self.countdown.start() {
            info!("Timer started at level {}", self.index + 1);
        }
    }

    pub fn pause(&mut self) {
        self.countdown.pause();
    }

    /// Start when paused, pause when running. Returns the new running flag.
    pub fn toggle(&mut self) -> bool {
        if self.countdown.is_running() {
            self.pause();
        } else {
            self.start();
        }
        self.countdown.is_running()
    }

    pub fn reset(&mut self) {
        self.countdown.reset();
    }

    /// Apply a new level length. The timer stops; the current level is kept.
    pub fn set_duration(&mut self, seconds: u32) {
        info!("Level duration set to {}", format_mm_ss(seconds));
        self.countdown.set_duration(seconds);
    }

    pub fn tick(&mut self) -> Tick {
        if !self.countdown.is_running() {
            return Tick::Idle;
        }
        if !self.countdown.tick() {
            if self.countdown.duration() == 0 {
                return Tick::Idle;
            }
            return Tick::Counting {
                remaining: self.countdown.remaining(),
            };
        }

        self.index = self.clamped(self.index + 1);
        let level = self.current_level();
        info!(
            "Level expired, now at level {}/{}: {}",
            self.index + 1,
            self.levels.len(),
            level
        );
        Tick::Expired {
            level,
            level_index: self.index,
        }
    }

    // ---------- navigation ----------

    pub fn previous_level(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn next_level(&mut self) {
        self.index = self.clamped(self.index + 1);
    }

    fn clamped(&self, index: usize) -> usize {
        index.min(self.levels.len().saturating_sub(1))
    }

    // ---------- draft editing ----------

    pub fn append_level(&mut self) {
        self.draft.push(BlindLevel::default());
    }

    /// Drop a draft row. The draft always keeps at least one row.
    pub fn remove_level(&mut self, index: usize) -> Result<(), LevelEditError> {
        if index >= self.draft.len() {
            return Err(LevelEditError::OutOfRange {
                index,
                len: self.draft.len(),
            });
        }
        if self.draft.len() <= 1 {
            return Err(LevelEditError::LastLevel);
        }
        self.draft.remove(index);
        Ok(())
    }

    /// Overwrite one blind of a draft row with a coerced form value.
    pub fn update_level(
        &mut self,
        index: usize,
        field: LevelField,
        raw: &str,
    ) -> Result<(), LevelEditError> {
        let len = self.draft.len();
        let row = self
            .draft
            .get_mut(index)
            .ok_or(LevelEditError::OutOfRange { index, len })?;
        let value = coerce_positive(raw);
        match field {
            LevelField::Small => row.small = value,
            LevelField::Big => row.big = value,
        }
        Ok(())
    }

    /// Make the draft the active table and restart at level 1.
    pub fn apply_draft(&mut self) {
        self.levels = self.draft.clone();
        self.index = 0;
        debug!("Applied {} custom blind levels", self.levels.len());
    }

    /// Replace both tables with the default structure and restart at level 1.
    pub fn reset_to_default(&mut self) {
        self.levels = generate_blind_levels();
        self.draft = self.levels.clone();
        self.index = 0;
    }

    // ---------- read side ----------

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn remaining_display(&self) -> String {
        format_mm_ss(self.countdown.remaining())
    }

    pub fn levels(&self) -> &[BlindLevel] {
        &self.levels
    }

    pub fn draft(&self) -> &[BlindLevel] {
        &self.draft
    }

    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn current_level(&self) -> BlindLevel {
        self.levels[self.index]
    }

    /// Upcoming level, or `None` at the last level.
    pub fn upcoming_level(&self) -> Option<BlindLevel> {
        self.levels.get(self.index + 1).copied()
    }

    pub fn is_first_level(&self) -> bool {
        self.index == 0
    }

    pub fn is_last_level(&self) -> bool {
        self.index + 1 >= self.levels.len()
    }

    /// Page background: light green at the start of a level fading to red.
    pub fn background_rgb(&self) -> (u8, u8, u8) {
        let progress = self.countdown.progress();
        let lerp = |from: f64, to: f64| (from + (to - from) * progress).round() as u8;
        (lerp(144.0, 255.0), lerp(238.0, 144.0), lerp(144.0, 0.0))
    }
}
