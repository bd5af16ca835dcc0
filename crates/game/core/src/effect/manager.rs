//! Effect lifecycle: add, stack, advance, expire, cascade.
//!
//! Every operation takes the state by value. Unknown unit or effect ids
//! return the state unchanged.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::{Capability, DurationType, Effect};
use crate::engine::turns::rescale_on_speed_change;
use crate::state::{EffectId, GameState, Unit, UnitId};
use crate::stats;

/// Adds `effect` to unit `target`.
///
/// An existing effect with the same id is replaced in place. When the incoming
/// effect declares stacking, the stack count becomes
/// `min(existing + incoming, max)`. The previous instance's hook is removed
/// before the new one is applied.
pub fn add_effect(state: GameState, target: &UnitId, effect: Effect) -> GameState {
    if !state.registry.contains(target) {
        return state;
    }
    let own_turn = state.current_actor.as_ref() == Some(target);

    debug!(
        target: "combat::effects",
        unit = %target,
        effect = %effect.id,
        source = %effect.source,
        duration = effect.duration,
        "add effect"
    );

    state.update_unit(target, |unit| refresh(insert_effect(unit, effect, own_turn)))
}

fn insert_effect(mut unit: Unit, mut effect: Effect, own_turn: bool) -> Unit {
    effect.pending_skip = own_turn && effect.skip_first_turn_decrement;

    let existing = unit.effects.iter().position(|e| e.id == effect.id);
    let index = match existing {
        Some(index) => {
            let previous = unit.effects.remove(index);
            if let (Some(old), Some(incoming)) = (previous.stacking, effect.stacking.as_mut()) {
                incoming.count = (old.count + incoming.count).min(incoming.max);
            }
            if let Some(hook) = previous.hook {
                hook.remove(&mut unit);
            }
            index
        }
        None => unit.effects.len(),
    };

    effect.hook = effect.hook.map(|hook| hook.apply(&mut unit));
    unit.effects.insert(index, effect);
    unit
}

/// Removes effect `effect_id` from `target`, then every effect in the
/// registry linked to it, transitively.
pub fn remove_effect(state: GameState, target: &UnitId, effect_id: &EffectId) -> GameState {
    let mut state = state;
    let mut worklist = vec![(target.clone(), effect_id.clone())];
    let mut visited = BTreeSet::new();

    while let Some((owner, id)) = worklist.pop() {
        if !visited.insert((owner.clone(), id.clone())) {
            continue;
        }
        let present = state
            .unit(&owner)
            .is_some_and(|unit| unit.has_effect(&id));
        if !present {
            continue;
        }

        debug!(target: "combat::effects", unit = %owner, effect = %id, "remove effect");
        state = state.update_unit(&owner, |unit| refresh(take_effect(unit, &id)));

        // Effects mirroring the removed one die with it.
        for unit in state.registry.iter() {
            for effect in &unit.effects {
                if effect.linked_effect_id.as_ref() == Some(&id) {
                    trace!(
                        target: "combat::effects",
                        unit = %unit.id,
                        effect = %effect.id,
                        linked_to = %id,
                        "cascade"
                    );
                    worklist.push((unit.id.clone(), effect.id.clone()));
                }
            }
        }
    }
    state
}

fn take_effect(mut unit: Unit, id: &EffectId) -> Unit {
    if let Some(index) = unit.effects.iter().position(|e| &e.id == id) {
        let removed = unit.effects.remove(index);
        if let Some(hook) = removed.hook {
            hook.remove(&mut unit);
        }
    }
    unit
}

/// Removes every effect on `target` matching `predicate` (with cascade).
pub fn remove_effects_where(
    state: GameState,
    target: &UnitId,
    predicate: impl Fn(&Effect) -> bool,
) -> GameState {
    let ids: Vec<EffectId> = state
        .unit(target)
        .map(|unit| {
            unit.effects
                .iter()
                .filter(|effect| predicate(effect))
                .map(|effect| effect.id.clone())
                .collect()
        })
        .unwrap_or_default();

    ids.iter()
        .fold(state, |state, id| remove_effect(state, target, id))
}

/// Ticks `TurnStartBased` effects of `unit` at the start of its turn.
///
/// Crowd control is left to [`advance_crowd_control`].
pub fn advance_effects_on_turn_start(state: GameState, unit: &UnitId) -> GameState {
    advance(state, unit, DurationType::TurnStartBased, |effect| {
        !effect.tags.intersects(Capability::CROWD_CONTROL)
    })
    .0
}

/// Ticks the crowd-control effects of `unit` for a skipped turn.
///
/// Returns the state and the ids of the effects that expired.
pub fn advance_crowd_control(state: GameState, unit: &UnitId) -> (GameState, Vec<EffectId>) {
    advance(state, unit, DurationType::TurnStartBased, |effect| {
        effect.tags.intersects(Capability::CROWD_CONTROL)
    })
}

/// Ticks `TurnEndBased` effects of `unit` at the end of its turn.
///
/// Effects applied earlier in this same turn with `skip_first_turn_decrement`
/// are left untouched once.
pub fn advance_effects_on_turn_end(state: GameState, unit: &UnitId) -> GameState {
    advance(state, unit, DurationType::TurnEndBased, |_| true).0
}

fn advance(
    state: GameState,
    owner: &UnitId,
    boundary: DurationType,
    selected: impl Fn(&Effect) -> bool,
) -> (GameState, Vec<EffectId>) {
    let mut expired = Vec::new();
    let at_turn_end = boundary == DurationType::TurnEndBased;

    let state = state.update_unit(owner, |mut unit| {
        for effect in unit.effects.iter_mut() {
            if at_turn_end && effect.pending_skip {
                effect.pending_skip = false;
                if effect.duration_type == DurationType::TurnEndBased {
                    continue;
                }
            }
            if effect.duration_type != boundary || !selected(effect) {
                continue;
            }
            effect.duration -= 1;
            trace!(
                target: "combat::effects",
                unit = %unit.id,
                effect = %effect.id,
                remaining = effect.duration,
                "tick"
            );
            if effect.duration <= 0 {
                expired.push(effect.id.clone());
            }
        }
        unit
    });

    let state = expired
        .iter()
        .fold(state, |state, id| remove_effect(state, owner, id));
    (state, expired)
}

/// Removes up to `count` cleansable debuffs from `target`, most recent first.
pub fn cleanse(state: GameState, target: &UnitId, count: usize) -> GameState {
    remove_latest(state, target, count, |effect| {
        effect.is_debuff() && effect.has(Capability::CLEANSABLE)
    })
}

/// Removes up to `count` dispellable buffs from `target`, most recent first.
pub fn dispel(state: GameState, target: &UnitId, count: usize) -> GameState {
    remove_latest(state, target, count, |effect| {
        effect.is_buff() && effect.has(Capability::DISPELLABLE)
    })
}

fn remove_latest(
    state: GameState,
    target: &UnitId,
    count: usize,
    predicate: impl Fn(&Effect) -> bool,
) -> GameState {
    let ids: Vec<EffectId> = state
        .unit(target)
        .map(|unit| {
            unit.effects
                .iter()
                .rev()
                .filter(|effect| predicate(effect))
                .take(count)
                .map(|effect| effect.id.clone())
                .collect()
        })
        .unwrap_or_default();

    ids.iter()
        .fold(state, |state, id| remove_effect(state, target, id))
}

/// Recalculates stats and rescales the action value if speed changed.
fn refresh(unit: Unit) -> Unit {
    let old_spd = unit.spd();
    let unit = stats::recalculate(unit);
    let new_spd = unit.spd();
    rescale_on_speed_change(unit, old_spd, new_spd)
}
