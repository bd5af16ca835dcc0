//! Damage, break, healing and shield formulas.
//!
//! Everything here is a pure function of unit snapshots. Applying the results
//! to a [`GameState`](crate::state::GameState) is the engine's job.
//!
//! # Core Functions
//!
//! - `calculate_damage_with_crit_info`: direct hit damage with a crit roll
//! - `calculate_toughness_reduction`: toughness removed by a hit
//! - `calculate_break_damage_with_breakdown`: damage dealt when a weakness breaks
//! - `calculate_super_break_damage`: extra damage on broken enemies
//! - `calculate_healing` / `calculate_shield` / `effect_hit_chance`

pub mod breaking;
pub mod damage;
pub mod support;
pub mod toughness;

pub use breaking::{
    break_extra_delay, calculate_break_additional_damage, calculate_break_damage_with_breakdown,
    calculate_break_dot_damage, calculate_super_break_damage, level_multiplier,
};
pub use damage::{
    DamageBreakdown, DamageOutcome, calculate_additional_damage, calculate_damage_with_crit_info,
    calculate_dot_damage,
};
pub use support::{calculate_healing, calculate_shield, effect_hit_chance};
pub use toughness::calculate_toughness_reduction;

use crate::config::CombatConfig;
use crate::state::Unit;
use crate::stats::StatKey;

/// Per-hit contributions written by handlers during `BeforeDamageCalculation`.
///
/// Contributions are additive and commutative, so handler order does not
/// change the result. Reset before every hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageModifiers {
    pub dmg_boost: f64,
    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub def_ignore: f64,
    pub res_pen: f64,
    pub vuln: f64,
    pub break_efficiency: f64,
}

/// Level-based defence multiplier.
///
/// ```text
/// (La + 20) / ((Ld + 20) × (1 − def_reduction) × (1 − min(1, def_ignore)) + (La + 20))
/// ```
pub fn def_multiplier(attacker: &Unit, defender: &Unit, extra_ignore: f64) -> f64 {
    let attacker_level = f64::from(attacker.level) + 20.0;
    let defender_level = f64::from(defender.level) + 20.0;
    let reduction = defender.stat(StatKey::DefReduction);
    let ignore = (attacker.stat(StatKey::DefIgnore) + extra_ignore).min(1.0);

    attacker_level / (defender_level * (1.0 - reduction) * (1.0 - ignore) + attacker_level)
}

/// `1 − (res − pen)` for the attacker's element.
pub fn res_multiplier(attacker: &Unit, defender: &Unit, extra_pen: f64) -> f64 {
    let element = attacker.element;
    let res = defender.stat(element.res_stat());
    let pen = attacker.stat(element.res_pen_stat()) + attacker.stat(StatKey::AllTypeResPen);
    1.0 - (res - (pen + extra_pen))
}

pub fn vuln_multiplier(attacker: &Unit, defender: &Unit, extra_vuln: f64) -> f64 {
    1.0 + defender.stat(StatKey::AllTypeVuln)
        + defender.stat(attacker.element.vuln_stat())
        + extra_vuln
}

/// Damage taken is reduced while toughness remains.
pub fn broken_multiplier(defender: &Unit) -> f64 {
    if defender.toughness > 0.0 {
        CombatConfig::UNBROKEN_DAMAGE_MULTIPLIER
    } else {
        1.0
    }
}
