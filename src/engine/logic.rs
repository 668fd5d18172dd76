//! Economy engine operations — pure functions over `EngineState`, fully testable.
//!
//! Every precondition failure (unknown id, not enough currency, not enough
//! progress) is a no-op reported through the return value.

use super::rng::RandomSource;
use super::state::{EngineState, UpgradeKind, CRIT_CHANCE_CAP};
use crate::time::{Millis, MS_PER_TICK, TICKS_PER_SEC};

/// Offline earnings never cover more than 12 hours.
pub const OFFLINE_CAP_SECS: f64 = 12.0 * 3600.0;
/// Offline earnings at or below this are not reported (nor granted).
pub const OFFLINE_REPORT_THRESHOLD: f64 = 1.0;
/// Each boost activation adds 5 minutes.
pub const BOOST_DURATION_MS: u64 = 5 * 60 * 1000;

/// Outcome of a single tap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapOutcome {
    pub gain: f64,
    pub crit: bool,
}

/// Income granted for time spent away.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfflineEarnings {
    pub earned: f64,
    /// Credited duration after the cap.
    pub seconds: f64,
}

/// Manual tap: update combo, roll crit, add the gain to currency.
pub fn tap(state: &mut EngineState, now: Millis, rng: &mut impl RandomSource) -> TapOutcome {
    state.combo.register_tap(now);

    let mut gain = state.tap_power(now);
    let crit = rng.next_unit() < state.crit_chance;
    if crit {
        gain *= state.crit_multiplier;
    }
    state.currency += gain;
    TapOutcome { gain, crit }
}

/// Try to buy the next level of a tap upgrade. Returns true if successful.
pub fn purchase_tap_upgrade(state: &mut EngineState, id: &str) -> bool {
    let idx = match state.tap_upgrades.iter().position(|u| u.id == id) {
        Some(i) => i,
        None => return false,
    };
    let cost = state.tap_upgrades[idx].cost();
    let next_level = match state.tap_upgrades[idx].level.checked_add(1) {
        Some(level) if cost.is_finite() && state.currency >= cost => level,
        _ => return false,
    };

    state.currency -= cost;
    let upgrade = &mut state.tap_upgrades[idx];
    upgrade.level = next_level;
    if upgrade.kind == UpgradeKind::CritBonus {
        state.crit_chance = (state.crit_chance + upgrade.magnitude).min(CRIT_CHANCE_CAP);
    }
    true
}

/// Try to buy one producer. Returns true if successful.
pub fn purchase_producer(state: &mut EngineState, id: &str) -> bool {
    let producer = match state.producers.iter_mut().find(|p| p.id == id) {
        Some(p) => p,
        None => return false,
    };
    let cost = producer.cost();
    let next_quantity = match producer.quantity.checked_add(1) {
        Some(quantity) if cost.is_finite() && state.currency >= cost => quantity,
        _ => return false,
    };

    state.currency -= cost;
    producer.quantity = next_quantity;
    true
}

/// Accrue passive income for `seconds`. Shared by the live tick and
/// offline catch-up; the income is linear in time.
pub fn advance_time(state: &mut EngineState, seconds: f64, now: Millis) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }
    let gain = state.passive_rate(now) * seconds;
    state.currency += gain;
    gain
}

/// Advance by `delta_ticks` fixed-cadence ticks, the last one at `now` and
/// each earlier one `MS_PER_TICK` before it: passive income plus the combo
/// idle-decay check, both evaluated at each tick's own time.
pub fn tick(state: &mut EngineState, delta_ticks: u32, now: Millis) {
    if delta_ticks == 0 {
        return;
    }
    // Boosted ticks form a prefix of the batch; split there.
    let first = now.saturating_sub((delta_ticks - 1) as u64 * MS_PER_TICK);
    let boosted = state.boosted_ticks(delta_ticks, now);
    let plain = delta_ticks - boosted;
    advance_time(state, boosted as f64 / TICKS_PER_SEC as f64, first);
    advance_time(state, plain as f64 / TICKS_PER_SEC as f64, now);
    state.combo.decay(now, delta_ticks);
}

/// Credit income for the time since the last save, capped at 12 hours.
///
/// Returns `None` when the earnings would not exceed the reporting
/// threshold. Either way the save watermark moves to `now`, so running
/// this twice never pays the same span twice.
pub fn apply_offline_catch_up(state: &mut EngineState, now: Millis) -> Option<OfflineEarnings> {
    let elapsed = now.saturating_sub(state.last_save) as f64 / 1000.0;
    let seconds = elapsed.min(OFFLINE_CAP_SECS);
    state.last_save = state.last_save.max(now);

    if state.passive_rate(now) * seconds <= OFFLINE_REPORT_THRESHOLD {
        return None;
    }
    let earned = advance_time(state, seconds, now);
    Some(OfflineEarnings { earned, seconds })
}

/// Reset for prestige points. Returns the points earned, or `None` (and
/// leaves the state untouched) when progress is insufficient.
pub fn prestige(state: &mut EngineState) -> Option<u64> {
    let gain = state.prestige_gain();
    if gain == 0 {
        return None;
    }

    let points = state.prestige_points + gain;
    let last_save = state.last_save;
    *state = EngineState::new(last_save);
    state.prestige_points = points;
    Some(gain)
}

/// Start or extend the income boost. Remaining time stacks.
pub fn activate_boost(state: &mut EngineState, now: Millis) {
    state.boost_expiry = state.boost_expiry.max(now) + BOOST_DURATION_MS;
}

/// Wipe everything, prestige points included.
pub fn hard_reset(state: &mut EngineState, now: Millis) {
    *state = EngineState::new(now);
}
