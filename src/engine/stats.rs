//! Derived stats: tap power, passive rate and the multipliers feeding them.

use super::state::{EngineState, UpgradeKind};
use crate::time::{Millis, MS_PER_TICK};

/// Prestige bonus per point (+10%).
pub const PRESTIGE_BONUS_PER_POINT: f64 = 0.10;
/// Income multiplier while a boost is active.
pub const BOOST_MULTIPLIER: f64 = 2.0;
/// Valuation that earns the first prestige point.
pub const PRESTIGE_SCALE: f64 = 50_000.0;
/// Producers count for their base cost times this in the prestige valuation.
pub const PRODUCER_VALUATION_FACTOR: f64 = 1.2;

/// Current price of an item and whether the player can pay it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Offer {
    pub cost: f64,
    pub affordable: bool,
}

impl EngineState {
    pub fn prestige_multiplier(&self) -> f64 {
        1.0 + self.prestige_points as f64 * PRESTIGE_BONUS_PER_POINT
    }

    pub fn boost_active(&self, now: Millis) -> bool {
        now < self.boost_expiry
    }

    pub fn boost_multiplier(&self, now: Millis) -> f64 {
        if self.boost_active(now) {
            BOOST_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Milliseconds of boost left at `now` (0 when inactive).
    pub fn boost_remaining_ms(&self, now: Millis) -> u64 {
        self.boost_expiry.saturating_sub(now)
    }

    /// How many of `ticks` ticks, the last at `now` and spaced
    /// `MS_PER_TICK` apart, fall inside the boost window.
    pub fn boosted_ticks(&self, ticks: u32, now: Millis) -> u32 {
        if ticks == 0 {
            return 0;
        }
        if self.boost_active(now) {
            return ticks;
        }
        // Tick k steps back is boosted iff k * MS_PER_TICK > now - expiry.
        let since_expiry = now - self.boost_expiry;
        let unboosted = since_expiry / MS_PER_TICK + 1;
        (ticks as u64).saturating_sub(unboosted) as u32
    }

    /// Yield of one tap before the crit roll, combo included.
    pub fn tap_power(&self, now: Millis) -> f64 {
        let mut additive = self.tap_base;
        let mut multiplicative = 1.0;
        for u in &self.tap_upgrades {
            match u.kind {
                UpgradeKind::Additive => additive += u.level as f64 * u.magnitude,
                UpgradeKind::Multiplicative => multiplicative *= u.magnitude.powf(u.level as f64),
                UpgradeKind::CritBonus => {}
            }
        }
        additive
            * multiplicative
            * self.prestige_multiplier()
            * self.boost_multiplier(now)
            * self.combo.value()
    }

    /// Currency per second from producers. Combo never applies here.
    pub fn passive_rate(&self, now: Millis) -> f64 {
        let base: f64 = self.producers.iter().map(|p| p.base_output()).sum();
        base * self.prestige_multiplier() * self.boost_multiplier(now)
    }

    /// Currency plus a rough resale value of owned producers.
    pub fn prestige_valuation(&self) -> f64 {
        self.currency
            + self
                .producers
                .iter()
                .map(|p| p.quantity as f64 * p.base_cost * PRODUCER_VALUATION_FACTOR)
                .sum::<f64>()
    }

    /// Points a prestige right now would grant: `floor(sqrt(valuation / 50k))`.
    pub fn prestige_gain(&self) -> u64 {
        let ratio = (self.prestige_valuation() / PRESTIGE_SCALE).max(0.0);
        let gain = ratio.sqrt().floor();
        if gain.is_finite() {
            gain as u64
        } else {
            0
        }
    }

    pub fn producer_offer(&self, id: &str) -> Option<Offer> {
        self.producer(id).map(|p| {
            let cost = p.cost();
            Offer {
                cost,
                affordable: self.currency >= cost,
            }
        })
    }

    pub fn upgrade_offer(&self, id: &str) -> Option<Offer> {
        self.upgrade(id).map(|u| {
            let cost = u.cost();
            Offer {
                cost,
                affordable: self.currency >= cost,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::combo::Combo;
    use super::*;

    const NOW: Millis = 1_000_000;

    #[test]
    fn base_tap_power_is_one() {
        let s = EngineState::new(NOW);
        assert!((s.tap_power(NOW) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn additive_and_multiplicative_upgrades() {
        let mut s = EngineState::new(NOW);
        s.tap_upgrades[0].level = 2; // +2
        s.tap_upgrades[1].level = 1; // +5
        s.tap_upgrades[2].level = 2; // ×1.44
        // (1 + 2 + 5) × 1.44
        assert!((s.tap_power(NOW) - 11.52).abs() < 1e-9);
    }

    #[test]
    fn crit_upgrade_does_not_change_tap_power() {
        let mut s = EngineState::new(NOW);
        s.tap_upgrades[4].level = 3;
        assert!((s.tap_power(NOW) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tap_power_includes_every_multiplier() {
        let mut s = EngineState::new(NOW);
        s.prestige_points = 5; // ×1.5
        s.boost_expiry = NOW + 1; // ×2
        s.combo = Combo::restore(2.0, 0, 900); // ×2
        assert!((s.tap_power(NOW) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn passive_rate_excludes_combo() {
        let mut s = EngineState::new(NOW);
        s.producers[0].quantity = 4; // 2.0/s
        s.producers[2].quantity = 1; // 20/s
        s.combo = Combo::restore(3.0, 0, 900);
        assert!((s.passive_rate(NOW) - 22.0).abs() < 1e-9);
        s.prestige_points = 10; // ×2
        s.boost_expiry = NOW + 5; // ×2
        assert!((s.passive_rate(NOW) - 88.0).abs() < 1e-9);
    }

    #[test]
    fn boost_expires_at_its_timestamp() {
        let mut s = EngineState::new(NOW);
        s.boost_expiry = NOW;
        assert_eq!(s.boost_multiplier(NOW), 1.0);
        assert_eq!(s.boost_multiplier(NOW - 1), 2.0);
        assert_eq!(s.boost_remaining_ms(NOW - 10), 10);
        assert_eq!(s.boost_remaining_ms(NOW + 10), 0);
    }

    #[test]
    fn prestige_gain_thresholds() {
        let mut s = EngineState::new(NOW);
        s.currency = 49_999.0;
        assert_eq!(s.prestige_gain(), 0);
        s.currency = 50_000.0;
        assert_eq!(s.prestige_gain(), 1);
        s.currency = 200_000.0;
        assert_eq!(s.prestige_gain(), 2);
    }

    #[test]
    fn prestige_valuation_counts_producers() {
        let mut s = EngineState::new(NOW);
        s.producers[4].quantity = 1; // 45000 × 1.2 = 54000
        assert!((s.prestige_valuation() - 54_000.0).abs() < 1e-9);
        assert_eq!(s.prestige_gain(), 1);
    }

    #[test]
    fn offers_report_affordability() {
        let mut s = EngineState::new(NOW);
        s.currency = 30.0;
        assert_eq!(
            s.producer_offer("intern"),
            Some(Offer {
                cost: 25.0,
                affordable: true
            })
        );
        assert_eq!(s.upgrade_offer("tp1").map(|o| o.affordable), Some(false));
        assert!(s.producer_offer("ghost").is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_prestige_gain_monotonic(a in 0.0f64..1e12, b in 0.0f64..1e12) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let mut s = EngineState::new(0);
            s.currency = lo;
            let g_lo = s.prestige_gain();
            s.currency = hi;
            prop_assert!(s.prestige_gain() >= g_lo);
        }

        #[test]
        fn prop_tap_power_positive(levels in prop::collection::vec(0u32..30, 5), points in 0u64..100) {
            let mut s = EngineState::new(0);
            for (u, l) in s.tap_upgrades.iter_mut().zip(levels) {
                u.level = l;
            }
            s.prestige_points = points;
            prop_assert!(s.tap_power(0) >= 1.0);
        }
    }
}
