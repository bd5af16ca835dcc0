//! Energy gain and caps.

use crate::state::Unit;
use crate::stats::StatKey;

/// Outcome of an energy gain.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyGain {
    pub unit: Unit,
    /// Energy actually added after the cap.
    pub gained: f64,
    /// True when this gain filled the unit's energy for the first time since it was last below max.
    pub became_full: bool,
}

/// Adds `base × (1 + energy regen rate) + flat` energy, capped at max energy.
pub fn gain_energy(mut unit: Unit, base: f64, flat: f64) -> EnergyGain {
    let max = unit.max_ep();
    let was_full = max > 0.0 && unit.ep >= max;

    let amount = base * (1.0 + unit.stat(StatKey::EnergyRegenRate)) + flat;
    let before = unit.ep;
    unit.ep = (unit.ep + amount.max(0.0)).min(max.max(0.0));

    EnergyGain {
        gained: unit.ep - before,
        became_full: !was_full && max > 0.0 && unit.ep >= max,
        unit,
    }
}

/// Spends all energy for an ultimate, then refunds `refund` (regen rate applies).
pub fn consume_for_ultimate(mut unit: Unit, refund: f64) -> EnergyGain {
    unit.ep = 0.0;
    gain_energy(unit, refund, 0.0)
}

/// Sets energy to `ratio` of max energy.
pub fn initialize_energy(mut unit: Unit, ratio: f64) -> Unit {
    unit.ep = unit.max_ep() * ratio.clamp(0.0, 1.0);
    unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::state::UnitId;

    fn unit(max_ep: f64, err: f64) -> Unit {
        Unit::character(UnitId::new("a"), "A", Element::Ice)
            .with_base_stat(StatKey::MaxEp, max_ep)
            .with_base_stat(StatKey::EnergyRegenRate, err)
            .ready()
    }

    #[test]
    fn regen_rate_scales_base_but_not_flat() {
        let gain = gain_energy(unit(140.0, 0.2), 30.0, 10.0);
        // 30 × 1.2 + 10
        assert!((gain.gained - 46.0).abs() < 1e-9);
        assert!(!gain.became_full);
    }

    #[test]
    fn energy_is_capped_and_full_signalled_once() {
        let mut start = unit(100.0, 0.0);
        start.ep = 90.0;
        let first = gain_energy(start, 30.0, 0.0);
        assert_eq!(first.unit.ep, 100.0);
        assert_eq!(first.gained, 10.0);
        assert!(first.became_full);

        let second = gain_energy(first.unit, 30.0, 0.0);
        assert_eq!(second.gained, 0.0);
        assert!(!second.became_full);
    }

    #[test]
    fn ultimate_resets_then_refunds() {
        let mut full = unit(120.0, 0.0);
        full.ep = 120.0;
        let gain = consume_for_ultimate(full, 5.0);
        assert_eq!(gain.unit.ep, 5.0);
    }

    #[test]
    fn initial_energy_is_half() {
        let unit = initialize_energy(unit(140.0, 0.0), 0.5);
        assert_eq!(unit.ep, 70.0);
    }
}
