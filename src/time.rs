//! Fixed-timestep game clock using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. GameTime converts
//! this into a fixed number of discrete ticks per second so passive
//! income and combo decay run at the engine's cadence, not the frame rate.

/// Wall-clock milliseconds since the Unix epoch.
pub type Millis = u64;

/// Engine cadence: ticks per real-time second.
pub const TICKS_PER_SEC: u32 = 20;
/// Spacing between two engine ticks.
pub const MS_PER_TICK: u64 = 1000 / TICKS_PER_SEC as u64;

/// Current wall-clock time.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> Millis {
    js_sys::Date::now() as Millis
}

/// Current wall-clock time.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> Millis {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Millis)
        .unwrap_or(0)
}

pub struct GameTime {
    /// Milliseconds per tick (e.g. 50ms = 20 ticks/sec)
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl GameTime {
    /// Create a new GameTime with the given tick rate.
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp. Returns the number of discrete ticks
    /// to process this frame.
    ///
    /// Long stalls (backgrounded tab) are not clamped: the whole gap turns
    /// into ticks, and the engine's tick batch is closed-form so a large
    /// count costs the same as a small one. Clock regressions count as zero.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}
