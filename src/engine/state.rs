//! Engine state, the canonical producer/upgrade catalog, and the cost model.

use super::combo::Combo;
use crate::time::Millis;

/// Geometric growth per producer owned.
pub const PRODUCER_COST_GROWTH: f64 = 1.15;
/// Geometric growth per tap upgrade level.
pub const UPGRADE_COST_GROWTH: f64 = 1.65;
/// Hard ceiling on crit chance.
pub const CRIT_CHANCE_CAP: f64 = 0.30;
/// Most units of one producer, or levels of one upgrade, a loaded save may
/// claim. Every cost and multiplier stays finite up to here, and the
/// matching prices are far beyond any reachable currency.
pub const MAX_OWNED: u32 = 1_000;

/// Price of the next level of an upgrade: `floor(base × 1.65^level)`.
pub fn upgrade_cost(base_cost: f64, level: u32) -> f64 {
    (base_cost * UPGRADE_COST_GROWTH.powf(level as f64)).floor()
}

/// Price of the next unit of a producer: `floor(base × 1.15^quantity)`.
pub fn producer_cost(base_cost: f64, quantity: u32) -> f64 {
    (base_cost * PRODUCER_COST_GROWTH.powf(quantity as f64)).floor()
}

/// How a tap upgrade changes tap power.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpgradeKind {
    /// Adds `level × magnitude` to the tap base.
    Additive,
    /// Multiplies tap power by `magnitude^level`.
    Multiplicative,
    /// Adds `magnitude` to crit chance per level (capped).
    CritBonus,
}

/// An automated currency source.
#[derive(Clone, Debug, PartialEq)]
pub struct Producer {
    pub id: &'static str,
    pub name: &'static str,
    pub base_cost: f64,
    /// Currency per second per unit, before multipliers.
    pub base_rate: f64,
    pub quantity: u32,
}

impl Producer {
    const fn new(id: &'static str, name: &'static str, base_cost: f64, base_rate: f64) -> Self {
        Self {
            id,
            name,
            base_cost,
            base_rate,
            quantity: 0,
        }
    }

    /// Current cost to buy the next one.
    pub fn cost(&self) -> f64 {
        producer_cost(self.base_cost, self.quantity)
    }

    /// Unmultiplied currency per second from all owned units.
    pub fn base_output(&self) -> f64 {
        self.quantity as f64 * self.base_rate
    }
}

/// A permanent, levelled modifier to tap power or crit chance.
#[derive(Clone, Debug, PartialEq)]
pub struct TapUpgrade {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: f64,
    pub level: u32,
    pub kind: UpgradeKind,
    pub magnitude: f64,
}

impl TapUpgrade {
    const fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        base_cost: f64,
        kind: UpgradeKind,
        magnitude: f64,
    ) -> Self {
        Self {
            id,
            name,
            description,
            base_cost,
            level: 0,
            kind,
            magnitude,
        }
    }

    /// Current cost of the next level.
    pub fn cost(&self) -> f64 {
        upgrade_cost(self.base_cost, self.level)
    }
}

/// The canonical producer set, in display order.
pub fn canonical_producers() -> Vec<Producer> {
    vec![
        Producer::new("intern", "Intern", 25.0, 0.5),
        Producer::new("worker", "Worker", 120.0, 2.5),
        Producer::new("factory", "Factory", 900.0, 20.0),
        Producer::new("plant", "Mega Plant", 6_500.0, 120.0),
        Producer::new("ai", "AI Core", 45_000.0, 900.0),
    ]
}

/// The canonical tap upgrade set, in display order.
pub fn canonical_upgrades() -> Vec<TapUpgrade> {
    use UpgradeKind::*;
    vec![
        TapUpgrade::new("tp1", "Stronger Fingers", "+1 per tap", 50.0, Additive, 1.0),
        TapUpgrade::new("tp2", "Tap Technique", "+5 per tap", 300.0, Additive, 5.0),
        TapUpgrade::new("tp3", "Power Gloves", "x1.20 tap power", 1_200.0, Multiplicative, 1.20),
        TapUpgrade::new("tp4", "Overclock", "x1.35 tap power", 9_000.0, Multiplicative, 1.35),
        TapUpgrade::new("tp5", "Crit Training", "+1% crit chance", 4_000.0, CritBonus, 0.01),
    ]
}

/// Full state of one economy. Owned by the driver and passed to every
/// engine operation; the renderer only borrows it.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineState {
    pub currency: f64,
    /// Per-tap yield before upgrades and multipliers.
    pub tap_base: f64,
    /// Always within `[0, CRIT_CHANCE_CAP]`.
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub combo: Combo,
    pub producers: Vec<Producer>,
    pub tap_upgrades: Vec<TapUpgrade>,
    /// Survives prestige resets.
    pub prestige_points: u64,
    /// Boost is active while `now < boost_expiry`.
    pub boost_expiry: Millis,
    /// Watermark for offline catch-up.
    pub last_save: Millis,
}

impl EngineState {
    /// Canonical defaults, stamped as saved at `now`.
    pub fn new(now: Millis) -> Self {
        Self {
            currency: 0.0,
            tap_base: 1.0,
            crit_chance: 0.05,
            crit_multiplier: 5.0,
            combo: Combo::new(),
            producers: canonical_producers(),
            tap_upgrades: canonical_upgrades(),
            prestige_points: 0,
            boost_expiry: 0,
            last_save: now,
        }
    }

    pub fn producer(&self, id: &str) -> Option<&Producer> {
        self.producers.iter().find(|p| p.id == id)
    }

    pub fn upgrade(&self, id: &str) -> Option<&TapUpgrade> {
        self.tap_upgrades.iter().find(|u| u.id == id)
    }

    /// Pull every field back inside its declared range.
    ///
    /// Applied after merging a loaded save, where stale or hand-edited data
    /// may carry values the engine itself would never produce.
    pub fn clamp_to_invariants(&mut self) {
        let defaults = EngineState::new(self.last_save);
        if !self.currency.is_finite() || self.currency < 0.0 {
            self.currency = 0.0;
        }
        if !self.tap_base.is_finite() || self.tap_base <= 0.0 {
            self.tap_base = defaults.tap_base;
        }
        self.crit_chance = if self.crit_chance.is_finite() {
            self.crit_chance.clamp(0.0, CRIT_CHANCE_CAP)
        } else {
            defaults.crit_chance
        };
        if !self.crit_multiplier.is_finite() || self.crit_multiplier <= 1.0 {
            self.crit_multiplier = defaults.crit_multiplier;
        }
        for p in &mut self.producers {
            p.quantity = p.quantity.min(MAX_OWNED);
        }
        for u in &mut self.tap_upgrades {
            u.level = u.level.min(MAX_OWNED);
        }
        self.combo.clamp_to_invariants();
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_producer_cost_strictly_increases(idx in 0usize..5, qty in 0u32..150) {
            let base = canonical_producers()[idx].base_cost;
            prop_assert!(producer_cost(base, qty + 1) > producer_cost(base, qty));
        }

        #[test]
        fn prop_upgrade_cost_strictly_increases(idx in 0usize..5, level in 0u32..60) {
            let base = canonical_upgrades()[idx].base_cost;
            prop_assert!(upgrade_cost(base, level + 1) > upgrade_cost(base, level));
        }

        #[test]
        fn prop_costs_are_pure(base in 1.0f64..1e6, n in 0u32..100) {
            prop_assert_eq!(producer_cost(base, n), producer_cost(base, n));
            prop_assert_eq!(upgrade_cost(base, n), upgrade_cost(base, n));
        }

        #[test]
        fn prop_costs_are_whole_numbers(base in 1.0f64..1e6, n in 0u32..100) {
            prop_assert_eq!(producer_cost(base, n).fract(), 0.0);
            prop_assert_eq!(upgrade_cost(base, n).fract(), 0.0);
        }
    }
}
