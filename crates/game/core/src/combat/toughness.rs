//! Toughness reduction.

use super::DamageModifiers;
use crate::state::Unit;
use crate::stats::StatKey;

/// Toughness removed by a hit: `base × (1 + break_efficiency + mods)`.
pub fn calculate_toughness_reduction(base: f64, attacker: &Unit, mods: &DamageModifiers) -> f64 {
    let efficiency = 1.0 + attacker.stat(StatKey::BreakEfficiencyBoost) + mods.break_efficiency;
    (base * efficiency).max(0.0)
}

/// Whether a hit from `attacker` may reduce `defender`'s toughness at all.
pub fn can_reduce_toughness(attacker: &Unit, defender: &Unit) -> bool {
    defender.max_toughness > 0.0 && defender.weaknesses.has(attacker.element)
}
