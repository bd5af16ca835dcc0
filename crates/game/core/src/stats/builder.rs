//! Effective stat derivation.

use std::collections::BTreeMap;

use super::{Bonus, BonusStack, Modifier, StatBlock, StatKey, Trace};
use crate::effect::Effect;
use crate::state::Unit;

/// Computes effective stats from every layer.
///
/// Keys present in `base` or touched by any modifier appear in the result;
/// the rest read as zero.
pub fn compute_stats(
    base: &StatBlock,
    equipment: &[Modifier],
    traces: &[Trace],
    effects: &[Effect],
    auras: &[Modifier],
) -> StatBlock {
    let mut stacks: BTreeMap<StatKey, BonusStack> = BTreeMap::new();

    let equipment_bonuses = equipment
        .iter()
        .map(|modifier| (modifier.stat, Bonus::from_modifier(modifier, 1)));
    let trace_bonuses = traces
        .iter()
        .filter_map(|trace| trace.bonus.as_ref())
        .map(|modifier| (modifier.stat, Bonus::from_modifier(modifier, 1)));
    let effect_bonuses = effects.iter().flat_map(|effect| {
        let stacks = effect.stack_count();
        effect
            .modifiers
            .iter()
            .map(move |modifier| (modifier.stat, Bonus::from_modifier(modifier, stacks)))
    });

    let aura_bonuses = auras
        .iter()
        .map(|modifier| (modifier.stat, Bonus::from_modifier(modifier, 1)));

    for (stat, bonus) in equipment_bonuses
        .chain(trace_bonuses)
        .chain(effect_bonuses)
        .chain(aura_bonuses)
    {
        stacks.entry(stat).or_default().add(bonus);
    }

    let mut stats = base.clone();
    for (stat, stack) in stacks {
        stats.set(stat, stack.apply(base.get(stat)));
    }
    stats
}

/// Recomputes `unit.stats` and clamps HP and energy to the new maximums.
pub fn recalculate(mut unit: Unit) -> Unit {
    unit.stats = compute_stats(
        &unit.base_stats,
        &unit.equipment,
        &unit.traces,
        &unit.effects,
        &unit.auras,
    );
    unit.hp = unit.hp.clamp(0.0, unit.max_hp());
    unit.ep = unit.ep.clamp(0.0, unit.max_ep());
    unit
}
