//! Healing, shields and effect hit chance.

use crate::action::SupportSpec;
use crate::state::Unit;
use crate::stats::StatKey;

/// `(stat × multiplier + flat) × (1 + outgoing + incoming)`.
pub fn calculate_healing(source: &Unit, target: &Unit, spec: &SupportSpec) -> f64 {
    let base = source.stat(spec.scaling) * spec.multiplier + spec.flat;
    let boost = 1.0
        + source.stat(StatKey::OutgoingHealingBoost)
        + target.stat(StatKey::IncomingHealBoost);
    (base * boost).max(0.0)
}

/// `(stat × multiplier + flat) × (1 + shield_strength_boost)`.
pub fn calculate_shield(source: &Unit, spec: &SupportSpec) -> f64 {
    let base = source.stat(spec.scaling) * spec.multiplier + spec.flat;
    (base * (1.0 + source.stat(StatKey::ShieldStrengthBoost))).max(0.0)
}

/// Chance that a debuff with base chance `base` lands.
///
/// ```text
/// base × (1 + effect_hit_rate) × (1 − effect_res) × (1 − debuff_res)
/// ```
pub fn effect_hit_chance(base: f64, attacker: &Unit, defender: &Unit) -> f64 {
    base * (1.0 + attacker.stat(StatKey::EffectHitRate))
        * (1.0 - defender.stat(StatKey::EffectRes))
        * (1.0 - defender.stat(StatKey::DebuffRes))
}
