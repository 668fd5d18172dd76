//! Driver-side application: input dispatch, message log and the tick/save
//! cadence. All economy rules live in `engine`; this only calls into it.

use rand_chacha::ChaCha8Rng;

use crate::engine::{logic, rng, save, EngineState};
use crate::format::{format_compact, format_duration};
use crate::time::{GameTime, Millis, TICKS_PER_SEC};

/// Maximum number of log lines kept.
const LOG_CAPACITY: usize = 50;

/// Log entry shown in the message panel.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// An irreversible action waiting for a second key press.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Confirm {
    Prestige,
    HardReset,
}

pub struct App {
    pub state: EngineState,
    pub log: Vec<LogEntry>,
    pub pending: Option<Confirm>,
    rng: ChaCha8Rng,
    clock: GameTime,
    store: Box<dyn save::BlobStore>,
    ticks_since_save: u32,
}

impl App {
    /// Load the save and run offline catch-up. Must happen before any
    /// other input is handled.
    pub fn start(mut store: Box<dyn save::BlobStore>, now: Millis) -> Self {
        let state = save::load_game(store.as_mut(), now);
        let mut app = Self {
            state,
            log: Vec::new(),
            pending: None,
            rng: rng::seeded(now),
            clock: GameTime::new(TICKS_PER_SEC),
            store,
            ticks_since_save: 0,
        };
        app.add_log("Welcome to Tap to Empire!", true);

        if let Some(offline) = logic::apply_offline_catch_up(&mut app.state, now) {
            app.add_log(
                &format!(
                    "Offline earnings: +{} coins ({})",
                    format_compact(offline.earned),
                    format_duration(offline.seconds)
                ),
                true,
            );
        }
        app
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > LOG_CAPACITY {
            self.log.remove(0);
        }
    }

    /// Advance the clock to `now`, run due ticks and autosave on cadence.
    pub fn frame(&mut self, now: Millis) {
        let ticks = self.clock.update(now as f64);
        if ticks == 0 {
            return;
        }
        logic::tick(&mut self.state, ticks, now);

        self.ticks_since_save += ticks;
        if self.ticks_since_save >= save::AUTOSAVE_INTERVAL {
            self.ticks_since_save = 0;
            self.save(now);
        }
    }

    /// Exit checkpoint: credit the ticks due since the last frame, then save.
    pub fn checkpoint(&mut self, now: Millis) -> bool {
        self.frame(now);
        self.save(now)
    }

    /// Write a snapshot. Failures are logged, never fatal.
    pub fn save(&mut self, now: Millis) -> bool {
        match save::save_game(&mut self.state, self.store.as_mut(), now) {
            Ok(()) => true,
            Err(e) => {
                self.add_log(&format!("Save failed: {e}"), true);
                false
            }
        }
    }

    /// Handle a key press. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: char, now: Millis) -> bool {
        // Any key other than the confirming one cancels a pending confirmation.
        let pending = self.pending.take();

        match key {
            ' ' | 't' => {
                let outcome = logic::tap(&mut self.state, now, &mut self.rng);
                if outcome.crit {
                    self.add_log(&format!("CRIT! +{}", format_compact(outcome.gain)), false);
                }
                true
            }
            '1'..='9' => {
                let idx = (key as u8 - b'1') as usize;
                let Some(id) = self.state.producers.get(idx).map(|p| p.id) else {
                    return false;
                };
                if logic::purchase_producer(&mut self.state, id) {
                    let p = &self.state.producers[idx];
                    let msg = format!("Hired {} (x{})", p.name, p.quantity);
                    self.add_log(&msg, false);
                }
                true
            }
            'a'..='e' => {
                let idx = (key as u8 - b'a') as usize;
                let Some(id) = self.state.tap_upgrades.get(idx).map(|u| u.id) else {
                    return false;
                };
                if logic::purchase_tap_upgrade(&mut self.state, id) {
                    let u = &self.state.tap_upgrades[idx];
                    let msg = format!("{} -> Lv {}", u.name, u.level);
                    self.add_log(&msg, false);
                }
                true
            }
            'x' => {
                logic::activate_boost(&mut self.state, now);
                let secs = self.state.boost_remaining_ms(now) / 1000;
                self.add_log(&format!("x2 boost active ({secs}s left)"), true);
                true
            }
            'p' => {
                self.prestige_key(pending, now);
                true
            }
            's' => {
                if self.save(now) {
                    self.add_log("Saved.", false);
                }
                true
            }
            'R' => {
                if pending == Some(Confirm::HardReset) {
                    logic::hard_reset(&mut self.state, now);
                    if let Err(e) = save::delete_save(self.store.as_mut()) {
                        self.add_log(&format!("Could not delete save: {e}"), true);
                    }
                    self.add_log("Hard reset. Everything is gone.", true);
                } else {
                    self.pending = Some(Confirm::HardReset);
                    self.add_log("Hard reset wipes your save. Press [R] again to confirm.", true);
                }
                true
            }
            _ => false,
        }
    }

    fn prestige_key(&mut self, pending: Option<Confirm>, now: Millis) {
        let gain = self.state.prestige_gain();
        if gain == 0 {
            self.add_log("Not enough progress to prestige yet.", true);
            return;
        }
        if pending != Some(Confirm::Prestige) {
            self.pending = Some(Confirm::Prestige);
            self.add_log(
                &format!(
                    "Prestige for +{gain} points? Resets coins, producers and upgrades. Press [P] again."
                ),
                true,
            );
            return;
        }

        if let Some(gain) = logic::prestige(&mut self.state) {
            self.add_log(
                &format!(
                    "Prestige! +{} points (total {}) income x{:.2}",
                    gain,
                    self.state.prestige_points,
                    self.state.prestige_multiplier()
                ),
                true,
            );
            self.save(now);
        }
    }
}
