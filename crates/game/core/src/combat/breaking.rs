//! Weakness break formulas.

use super::{DamageBreakdown, broken_multiplier, def_multiplier, res_multiplier, vuln_multiplier};
use crate::element::Element;
use crate::state::Unit;
use crate::stats::StatKey;

/// Break damage base by attacker level; values between entries are interpolated.
const LEVEL_MULTIPLIERS: [(u32, f64); 8] = [
    (1, 54.0),
    (20, 100.0),
    (30, 231.0),
    (40, 502.0),
    (50, 774.0),
    (60, 1640.0),
    (70, 2660.0),
    (80, 3767.55),
];

/// Enemies above this max toughness count as elite.
pub const ELITE_TOUGHNESS_THRESHOLD: f64 = 100.0;

const ENTANGLEMENT_BASE_DELAY: f64 = 0.20;
const IMPRISONMENT_BASE_DELAY: f64 = 0.30;

pub fn level_multiplier(level: u32) -> f64 {
    let (first_level, first_value) = LEVEL_MULTIPLIERS[0];
    if level <= first_level {
        return first_value;
    }
    for window in LEVEL_MULTIPLIERS.windows(2) {
        let (lo, lo_value) = window[0];
        let (hi, hi_value) = window[1];
        if level == hi {
            return hi_value;
        }
        if level < hi {
            let ratio = f64::from(level - lo) / f64::from(hi - lo);
            return lo_value + ratio * (hi_value - lo_value);
        }
    }
    LEVEL_MULTIPLIERS[LEVEL_MULTIPLIERS.len() - 1].1
}

/// `0.5 + max_toughness / 40`.
pub fn toughness_multiplier(max_toughness: f64) -> f64 {
    0.5 + max_toughness / 40.0
}

pub fn is_elite(unit: &Unit) -> bool {
    unit.max_toughness > ELITE_TOUGHNESS_THRESHOLD
}

/// Damage dealt to `defender` at the moment `attacker` breaks it.
///
/// # Formula
///
/// ```text
/// level_multiplier(La) × element_multiplier × (1 + break_effect)
///   × (0.5 + max_toughness / 40) × def × res × vuln × broken
/// ```
pub fn calculate_break_damage_with_breakdown(
    attacker: &Unit,
    defender: &Unit,
) -> (f64, DamageBreakdown) {
    let breakdown = DamageBreakdown {
        base: level_multiplier(attacker.level)
            * attacker.element.break_multiplier()
            * toughness_multiplier(defender.max_toughness),
        dmg_boost: 1.0 + attacker.stat(StatKey::BreakEffect),
        crit: 1.0,
        def: def_multiplier(attacker, defender, 0.0),
        res: res_multiplier(attacker, defender, 0.0),
        vuln: vuln_multiplier(attacker, defender, 0.0),
        broken: broken_multiplier(defender),
        defender_def: defender.stat(StatKey::Def),
    };
    (breakdown.total().max(0.0), breakdown)
}

/// Super break damage for a hit that removed `toughness_reduction` from an
/// already broken enemy. Zero unless the attacker has super break boost.
///
/// ```text
/// level_multiplier × (reduction / 10) × super_break_boost × (1 + break_effect)
///   × def × res × vuln × broken
/// ```
pub fn calculate_super_break_damage(
    attacker: &Unit,
    defender: &Unit,
    toughness_reduction: f64,
) -> f64 {
    let boost = attacker.stat(StatKey::SuperBreakDmgBoost);
    if boost <= 0.0 {
        return 0.0;
    }
    level_multiplier(attacker.level)
        * (toughness_reduction / 10.0)
        * boost
        * (1.0 + attacker.stat(StatKey::BreakEffect))
        * def_multiplier(attacker, defender, 0.0)
        * res_multiplier(attacker, defender, 0.0)
        * vuln_multiplier(attacker, defender, 0.0)
        * broken_multiplier(defender)
}

/// Break DoT tick (bleed, burn, shock, wind shear).
pub fn calculate_break_dot_damage(attacker: &Unit, defender: &Unit, base: f64) -> f64 {
    calculate_break_additional_damage(attacker, defender, base)
        * (1.0 + attacker.stat(StatKey::DotDmgBoost))
}

/// Break-scaled damage outside the break itself (freeze thaw, entanglement).
pub fn calculate_break_additional_damage(attacker: &Unit, defender: &Unit, base: f64) -> f64 {
    base * (1.0 + attacker.stat(StatKey::BreakEffect))
        * def_multiplier(attacker, defender, 0.0)
        * res_multiplier(attacker, defender, 0.0)
        * vuln_multiplier(attacker, defender, 0.0)
        * broken_multiplier(defender)
}

/// Action delay a break adds on top of the common break delay, as a fraction
/// of the action gauge.
pub fn break_extra_delay(element: Element, break_effect: f64) -> f64 {
    match element {
        Element::Quantum => ENTANGLEMENT_BASE_DELAY * (1.0 + break_effect),
        Element::Imaginary => IMPRISONMENT_BASE_DELAY * (1.0 + break_effect),
        _ => 0.0,
    }
}
