//! Event publication and action resolution.
//!
//! [`publish_event`] threads the state through every subscribed handler in
//! registration order. [`dispatch`] turns an [`Action`] into its lifecycle:
//! costs, per-hit events, breaks, support, energy, skill points, the action
//! event, ability effects and `ActionComplete`.

use tracing::{debug, trace, warn};

use super::context::{ActionContext, CombatContext};
use super::damage::{
    DamageOptions, add_energy, apply_break_effect, apply_healing, apply_shield,
    apply_super_break, apply_unified_damage, on_weakness_break, publish_damage_events,
    reduce_toughness,
};
use crate::action::{Ability, Action, ActionKind, EffectTarget, HitSpec, TargetType};
use crate::combat::{self, toughness::can_reduce_toughness};
use crate::config::CombatConfig;
use crate::effect::{self, Effect};
use crate::energy;
use crate::event::{DamageKind, Event, EventKind, EventPayload};
use crate::state::{EffectId, GameState, LogEntry, LogKind, Unit, UnitId};

/// Publishes `event` to every handler subscribed to its kind.
///
/// Publication nested deeper than [`CombatConfig::MAX_EVENT_DEPTH`] is dropped.
pub fn publish_event(state: GameState, ctx: &mut CombatContext<'_>, event: Event) -> GameState {
    let depth = ctx.enter();
    if depth > CombatConfig::MAX_EVENT_DEPTH {
        warn!(
            target: "combat::dispatch",
            kind = %event.kind,
            source = %event.source,
            depth,
            "event chain too deep, dropping"
        );
        ctx.leave();
        return state;
    }

    trace!(target: "combat::dispatch", kind = %event.kind, source = %event.source, depth, "publish");
    let handlers = state.handlers.subscribers(event.kind);
    let state = handlers
        .iter()
        .fold(state, |state, handler| handler.handle(&event, state, ctx));
    ctx.leave();
    state
}

/// Adds `effect` to `target` and announces it.
pub fn grant_effect(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    target: &UnitId,
    effect: Effect,
) -> GameState {
    if !state.unit(target).is_some_and(Unit::is_alive) {
        return state;
    }
    let source = effect.source.clone();
    let id = effect.id.clone();
    let is_debuff = effect.is_debuff();
    let action = ctx.action_kind();

    let mut state = effect::add_effect(state, target, effect);
    let announce = |kind| {
        Event::new(kind, source.clone())
            .with_target(target.clone())
            .with_action(action)
            .with_payload(EventPayload::Effect { effect: id.clone() })
    };
    state = publish_event(state, ctx, announce(EventKind::EffectApplied));
    if is_debuff {
        state = publish_event(state, ctx, announce(EventKind::DebuffApplied));
    }
    state
}

/// Removes effect `id` from `target` (with linked cascade) and announces it.
pub fn revoke_effect(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    target: &UnitId,
    id: &EffectId,
) -> GameState {
    let Some(source) = state
        .unit(target)
        .and_then(|unit| unit.effect(id))
        .map(|effect| effect.source.clone())
    else {
        return state;
    };
    let state = effect::remove_effect(state, target, id);
    publish_event(
        state,
        ctx,
        Event::new(EventKind::EffectRemoved, source)
            .with_target(target.clone())
            .with_payload(EventPayload::Effect { effect: id.clone() }),
    )
}

/// One hit instance against one target.
#[derive(Clone, Debug, PartialEq)]
struct HitPlan {
    index: usize,
    target: UnitId,
    multiplier: f64,
    toughness: f64,
    is_main_target: bool,
}

/// Resolves `action` against the current state.
///
/// Dead or unknown sources, missing abilities and actions with no valid
/// target return the state unchanged.
pub fn dispatch(state: GameState, ctx: &mut CombatContext<'_>, action: Action) -> GameState {
    let Some(source) = state.unit(&action.source).filter(|unit| unit.is_alive()) else {
        trace!(target: "combat::dispatch", unit = %action.source, "source unavailable");
        return state;
    };
    let Some(ability) = source.abilities.for_kind(action.kind).cloned() else {
        debug!(target: "combat::dispatch", unit = %action.source, kind = %action.kind, "no ability");
        return state;
    };
    let Some(primary) = resolve_primary(&state, source, &ability, action.target.as_ref()) else {
        debug!(target: "combat::dispatch", unit = %action.source, kind = %action.kind, "no target");
        return state;
    };

    debug!(
        target: "combat::dispatch",
        unit = %action.source,
        kind = %action.kind,
        ability = %ability.id,
        target = %primary,
        "dispatch"
    );

    let kind = action.kind;
    let source_id = action.source;
    let mut state = pay_costs(state, &source_id, kind, &ability);

    let log = LogEntry::new(state.time, state.round(), source_id.clone(), LogKind::Action(kind))
        .with_target(Some(primary.clone()));
    let interrupted = ctx.begin_action(ActionContext::new(
        source_id.clone(),
        kind,
        Some(primary.clone()),
        log,
    ));

    if let Some(damage) = &ability.damage {
        let scaling = damage.scaling;
        for (index, hit) in damage.hits.iter().enumerate() {
            for plan in plan_hits(&state, ctx, &source_id, &primary, &ability, index, hit) {
                state = resolve_hit(state, ctx, &source_id, kind, scaling, &plan);
            }
        }
    }

    let supported = support_targets(&state, &source_id, &primary, ability.target);
    if let Some(heal) = &ability.heal {
        for target in &supported {
            state = apply_healing(state, ctx, &source_id, target, heal);
        }
    }
    if let Some(shield) = &ability.shield {
        for target in &supported {
            state = apply_shield(state, ctx, &source_id, target, &shield.amount, shield.duration);
        }
    }

    if kind != ActionKind::Ultimate {
        state = add_energy(state, ctx, &source_id, ability.energy_gain, 0.0);
    }
    if ability.sp_gain > 0 && state.unit(&source_id).is_some_and(Unit::is_ally) {
        state = state.gain_skill_points(ability.sp_gain);
    }

    state = publish_event(
        state,
        ctx,
        Event::new(EventKind::for_action(kind), source_id.clone())
            .with_target(primary.clone())
            .with_action(Some(kind)),
    );

    for entry in &ability.effects {
        state = apply_ability_effect(state, ctx, &source_id, &primary, entry);
    }

    state = publish_event(
        state,
        ctx,
        Event::new(EventKind::ActionComplete, source_id.clone())
            .with_target(primary)
            .with_action(Some(kind)),
    );

    if let Some(finished) = ctx.end_action(interrupted) {
        state.log.push(finished.log);
    }
    state
}

fn pay_costs(state: GameState, source: &UnitId, kind: ActionKind, ability: &Ability) -> GameState {
    match kind {
        ActionKind::Skill => {
            let is_ally = state.unit(source).is_some_and(Unit::is_ally);
            let mut state = state;
            if is_ally {
                state.skill_points = state.skill_points.saturating_sub(ability.sp_cost);
            }
            state
        }
        ActionKind::Ultimate => state.update_unit(source, |unit| {
            energy::consume_for_ultimate(unit, ability.energy_gain).unit
        }),
        _ => state,
    }
}

/// Primary target: a supplied valid target, the taunt source, or the first
/// eligible unit on the addressed side.
fn resolve_primary(
    state: &GameState,
    source: &Unit,
    ability: &Ability,
    requested: Option<&UnitId>,
) -> Option<UnitId> {
    match ability.target {
        TargetType::SelfOnly => Some(source.id.clone()),
        TargetType::SingleAlly | TargetType::AllAllies => requested
            .and_then(|id| state.unit(id))
            .filter(|unit| unit.is_alive() && !unit.is_opponent_of(source))
            .map(|unit| unit.id.clone())
            .or_else(|| Some(source.id.clone())),
        _ => {
            let valid = |id: &UnitId| {
                state
                    .unit(id)
                    .filter(|unit| unit.is_alive() && unit.is_opponent_of(source))
                    .map(|unit| unit.id.clone())
            };
            source
                .taunted_by()
                .and_then(valid)
                .or_else(|| requested.and_then(valid))
                .or_else(|| {
                    state
                        .registry
                        .alive_opponents_of(source)
                        .first()
                        .map(|unit| unit.id.clone())
                })
        }
    }
}

/// Units hit by hit `index` of an offensive ability.
fn plan_hits(
    state: &GameState,
    ctx: &mut CombatContext<'_>,
    source: &UnitId,
    primary: &UnitId,
    ability: &Ability,
    index: usize,
    hit: &HitSpec,
) -> Vec<HitPlan> {
    let Some(caster) = state.unit(source) else {
        return Vec::new();
    };
    let opponents: Vec<UnitId> = state
        .registry
        .alive_opponents_of(caster)
        .into_iter()
        .map(|unit| unit.id.clone())
        .collect();
    if opponents.is_empty() {
        return Vec::new();
    }

    let main = |target: UnitId| HitPlan {
        index,
        is_main_target: &target == primary,
        target,
        multiplier: hit.multiplier,
        toughness: hit.toughness_reduction,
    };

    match ability.target {
        TargetType::SingleEnemy => opponents
            .iter()
            .find(|id| *id == primary)
            .cloned()
            .map(main)
            .into_iter()
            .collect(),
        TargetType::Blast => {
            let Some(center) = opponents.iter().position(|id| id == primary) else {
                return Vec::new();
            };
            let total = ability
                .damage
                .as_ref()
                .map_or(0.0, |damage| damage.total_multiplier());
            let share = ability
                .damage
                .as_ref()
                .filter(|_| total > 0.0)
                .map_or(0.0, |damage| damage.adjacent_multiplier * hit.multiplier / total);

            let mut plans = vec![main(primary.clone())];
            let neighbours = [center.checked_sub(1), Some(center + 1)];
            for neighbour in neighbours.into_iter().flatten() {
                if let Some(id) = opponents.get(neighbour) {
                    plans.push(HitPlan {
                        index,
                        target: id.clone(),
                        multiplier: share,
                        toughness: hit.toughness_reduction / 2.0,
                        is_main_target: false,
                    });
                }
            }
            plans
        }
        TargetType::Bounce if index > 0 => {
            let pick = ctx.rng.pick_index(opponents.len());
            vec![main(opponents[pick].clone())]
        }
        TargetType::Bounce => vec![main(primary.clone())],
        TargetType::AllEnemies => opponents.into_iter().map(main).collect(),
        TargetType::SingleAlly | TargetType::AllAllies | TargetType::SelfOnly => Vec::new(),
    }
}

fn resolve_hit(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    source: &UnitId,
    kind: ActionKind,
    scaling: crate::stats::StatKey,
    plan: &HitPlan,
) -> GameState {
    if !state.unit(&plan.target).is_some_and(Unit::is_alive) {
        return state;
    }

    let payload = EventPayload::Hit {
        hit_index: plan.index,
        multiplier: plan.multiplier,
        toughness_reduction: plan.toughness,
        is_main_target: plan.is_main_target,
    };
    ctx.reset_modifiers();
    let state = publish_event(
        state,
        ctx,
        Event::new(EventKind::BeforeDamageCalculation, source.clone())
            .with_target(plan.target.clone())
            .with_action(Some(kind))
            .with_payload(payload.clone()),
    );

    let mods = ctx.modifiers();
    let (outcome, reduction, super_break) = match (state.unit(source), state.unit(&plan.target)) {
        (Some(attacker), Some(defender)) if attacker.is_alive() && defender.is_alive() => {
            let outcome = combat::calculate_damage_with_crit_info(
                attacker,
                defender,
                scaling,
                plan.multiplier,
                Some(kind),
                &mods,
                &mut *ctx.rng,
            );
            let reduction =
                combat::calculate_toughness_reduction(plan.toughness, attacker, &mods);
            let super_break = defender.is_broken() && can_reduce_toughness(attacker, defender);
            (outcome, reduction, super_break)
        }
        _ => return state,
    };

    let (state, toughness) = reduce_toughness(state, source, &plan.target, reduction);
    let (state, entry) = apply_unified_damage(
        state,
        ctx,
        source,
        &plan.target,
        outcome.damage,
        DamageOptions::new(DamageKind::Direct, kind.to_string())
            .crit(outcome.is_crit)
            .deferred(),
    );

    let mut state = publish_event(
        state,
        ctx,
        Event::new(EventKind::AfterHit, source.clone())
            .with_target(plan.target.clone())
            .with_action(Some(kind))
            .with_value(entry.amount)
            .with_payload(payload),
    );
    state = publish_damage_events(state, ctx, &entry);

    // A hit that both breaks and kills still publishes WeaknessBreak, after
    // EnemyDefeated has already run.
    if toughness.broke {
        let (next, first) = on_weakness_break(state, ctx, source, &plan.target);
        state = next;
        if first {
            state = apply_break_effect(state, ctx, source, &plan.target);
        }
    } else if super_break {
        state = apply_super_break(state, ctx, source, &plan.target, reduction);
    }
    state
}

/// Receivers of an ability's heal or shield.
fn support_targets(
    state: &GameState,
    source: &UnitId,
    primary: &UnitId,
    target: TargetType,
) -> Vec<UnitId> {
    match target {
        TargetType::AllAllies => state
            .unit(source)
            .map(|caster| {
                state
                    .registry
                    .alive_teammates_of(caster)
                    .into_iter()
                    .map(|unit| unit.id.clone())
                    .collect()
            })
            .unwrap_or_default(),
        TargetType::SingleAlly | TargetType::SelfOnly => vec![primary.clone()],
        _ => vec![source.clone()],
    }
}

fn apply_ability_effect(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    source: &UnitId,
    primary: &UnitId,
    entry: &crate::action::AbilityEffect,
) -> GameState {
    let Some(caster) = state.unit(source) else {
        return state;
    };
    let receivers: Vec<UnitId> = match entry.target {
        EffectTarget::Primary => vec![primary.clone()],
        EffectTarget::Caster => vec![source.clone()],
        EffectTarget::AllOpponents => state
            .registry
            .alive_opponents_of(caster)
            .into_iter()
            .map(|unit| unit.id.clone())
            .collect(),
        EffectTarget::AllAllies => state
            .registry
            .alive_teammates_of(caster)
            .into_iter()
            .map(|unit| unit.id.clone())
            .collect(),
    };

    receivers.iter().fold(state, |state, receiver| {
        let landed = match (entry.chance, state.unit(source), state.unit(receiver)) {
            (None, _, _) => true,
            (Some(base), _, _) if entry.fixed_chance => ctx.roll(base),
            (Some(base), Some(attacker), Some(defender)) => {
                let chance = combat::effect_hit_chance(base, attacker, defender);
                ctx.roll(chance)
            }
            _ => false,
        };
        if !landed {
            trace!(target: "combat::dispatch", effect = %entry.effect.id, target = %receiver, "resisted");
            return state;
        }
        grant_effect(state, ctx, receiver, entry.effect.clone())
    })
}
