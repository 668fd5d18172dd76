//! Combo tracker: a tap multiplier that rewards rapid tapping and decays
//! when the player goes idle.

use crate::time::{Millis, MS_PER_TICK};

pub const COMBO_MIN: f64 = 1.0;
pub const COMBO_MAX: f64 = 3.0;

/// Gap below which a tap counts as rapid.
pub const RAPID_GAP_MS: u64 = 220;
/// Gap below which a tap counts as moderate.
pub const MODERATE_GAP_MS: u64 = 450;
/// Moderate tapping alone cannot push the combo past this.
pub const MODERATE_CAP: f64 = 2.2;

const RAPID_STEP: f64 = 0.03;
const MODERATE_STEP: f64 = 0.015;
const SLOW_PENALTY: f64 = 0.05;
const IDLE_DECAY_STEP: f64 = 0.02;

/// Default idle time before decay kicks in.
pub const DEFAULT_DECAY_THRESHOLD_MS: u64 = 900;

#[derive(Clone, Debug, PartialEq)]
pub struct Combo {
    value: f64,
    /// Time of the last tap.
    pub last_action: Millis,
    /// Idle time after which each tick decays the combo.
    pub decay_threshold_ms: u64,
}

impl Combo {
    pub fn new() -> Self {
        Self {
            value: COMBO_MIN,
            last_action: 0,
            decay_threshold_ms: DEFAULT_DECAY_THRESHOLD_MS,
        }
    }

    /// Restore from persisted parts, clamped.
    pub fn restore(value: f64, last_action: Millis, decay_threshold_ms: u64) -> Self {
        let mut combo = Self {
            value,
            last_action,
            decay_threshold_ms,
        };
        combo.clamp_to_invariants();
        combo
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Update on a tap at `now`, based on the gap since the previous tap.
    pub fn register_tap(&mut self, now: Millis) {
        let gap = now.saturating_sub(self.last_action);
        self.last_action = now;

        self.value = if gap < RAPID_GAP_MS {
            (self.value + RAPID_STEP).min(COMBO_MAX)
        } else if gap < MODERATE_GAP_MS {
            // Also pulls a rapid-built combo down to the moderate cap.
            (self.value + MODERATE_STEP).min(MODERATE_CAP)
        } else {
            (self.value - SLOW_PENALTY).max(COMBO_MIN)
        };
    }

    /// Idle decay for `ticks` consecutive ticks, the last one at `now` and
    /// each earlier one `MS_PER_TICK` before it. Only ticks that fall past
    /// the idle threshold decay.
    pub fn decay(&mut self, now: Millis, ticks: u32) {
        let idle_ticks = self.idle_ticks(now, ticks);
        if idle_ticks > 0 {
            self.value = (self.value - IDLE_DECAY_STEP * idle_ticks as f64).max(COMBO_MIN);
        }
    }

    /// How many of the `ticks` ending at `now` see more than the threshold
    /// of idle time.
    fn idle_ticks(&self, now: Millis, ticks: u32) -> u32 {
        let idle = now.saturating_sub(self.last_action);
        if ticks == 0 || idle <= self.decay_threshold_ms {
            return 0;
        }
        // Tick k steps back is idle iff k * MS_PER_TICK < excess.
        let excess = idle - self.decay_threshold_ms;
        let count = excess.div_ceil(MS_PER_TICK);
        count.min(ticks as u64) as u32
    }

    pub fn clamp_to_invariants(&mut self) {
        self.value = if self.value.is_finite() {
            self.value.clamp(COMBO_MIN, COMBO_MAX)
        } else {
            COMBO_MIN
        };
        if self.decay_threshold_ms == 0 {
            self.decay_threshold_ms = DEFAULT_DECAY_THRESHOLD_MS;
        }
    }
}

impl Default for Combo {
    fn default() -> Self {
        Self::new()
    }
}
