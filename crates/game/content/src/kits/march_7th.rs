//! March 7th (Ice, Preservation).
//!
//! Shields an ally with her skill and counters enemies that hit a shielded
//! ally, a limited number of times per turn. Her ultimate may freeze every
//! enemy.

use std::sync::Arc;

use combat_core::engine::{self, CombatContext};
use combat_core::{
    Ability, AbilityEffect, AbilitySet, Action, Capability, CombatHandler, DamageKind, DotDamage,
    DotKind, Effect, EffectId, EffectTarget, Element, Event, EventKind, EventPayload, GameState,
    HitSpec, DamageSpec, LogDetail, LogKind, Modifier, StatKey, SupportSpec, TargetType, Trace,
    Unit, UnitId, combat,
};
use tracing::debug;

use super::{Kit, leveled};

pub const KIT: Kit = Kit {
    id: "march_7th",
    name: "March 7th",
    build,
    handler,
};

/// The skill dispels one debuff from its target.
pub const TRACE_PURIFY: &str = "march-7th-trace-purify";
/// Skill shields last one extra turn.
pub const TRACE_REINFORCE: &str = "march-7th-trace-reinforce";
/// Freeze chance bonus on the ultimate.
pub const TRACE_ICE_SPELL: &str = "march-7th-trace-ice-spell";

const BASIC_EP: f64 = 20.0;
const SKILL_EP: f64 = 30.0;
const ULT_EP: f64 = 5.0;
const COUNTER_EP: f64 = 10.0;

const SHIELD_DURATION: i32 = 3;
const ULT_HITS: usize = 4;
const ULT_FREEZE_CHANCE: f64 = 0.50;
const ICE_SPELL_BONUS: f64 = 0.15;
const COUNTER_CHARGES: u32 = 2;
const E1_ENERGY: f64 = 6.0;
const E2_SHIELD: SupportSpec = SupportSpec {
    scaling: StatKey::Def,
    multiplier: 0.24,
    flat: 320.0,
};
const E6_HEAL_RATIO: f64 = 0.04;
const E6_HEAL_FLAT: f64 = 106.0;
const TECHNIQUE_FREEZE_CHANCE: f64 = 1.0;

pub fn counter_charges_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("march-7th-counter:{unit}"))
}

pub fn frozen_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("march-7th-frozen:{unit}"))
}

pub fn technique_frozen_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("march-7th-technique-frozen:{unit}"))
}

/// Id of the skill shield March places on an ally.
pub fn shield_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("shield:{unit}"))
}

pub fn build(id: UnitId, level: u32, eidolon: u8) -> Unit {
    let ult_total = leveled(eidolon, 3, 1.50, 1.62);
    let ult_hit = HitSpec::new(ult_total / ULT_HITS as f64, 5.0);
    let freeze_chance = ULT_FREEZE_CHANCE + ICE_SPELL_BONUS;

    let shield = SupportSpec {
        scaling: StatKey::Def,
        multiplier: leveled(eidolon, 5, 0.57, 0.60),
        flat: leveled(eidolon, 5, 760.0, 845.0),
    };
    let abilities = AbilitySet {
        basic: Some(
            Ability::new("march-7th-basic", "Frigid Cold Arrow", TargetType::SingleEnemy)
                .with_hit(StatKey::Atk, leveled(eidolon, 3, 1.00, 1.10), 10.0)
                .with_energy(BASIC_EP)
                .with_sp_gain(1),
        ),
        skill: Some(
            Ability::new("march-7th-skill", "The Power of Cuteness", TargetType::SingleAlly)
                .with_shield(shield, SHIELD_DURATION + 1)
                .with_energy(SKILL_EP)
                .with_sp_cost(1),
        ),
        ultimate: Some(
            Ability::new("march-7th-ultimate", "Glacial Cascade", TargetType::AllEnemies)
                .with_damage(DamageSpec::new(StatKey::Atk, vec![ult_hit; ULT_HITS]))
                .with_energy(ULT_EP)
                .with_effect(
                    AbilityEffect::new(frozen(&id, eidolon), EffectTarget::AllOpponents)
                        .with_chance(freeze_chance),
                ),
        ),
        follow_up: Some(
            Ability::new("march-7th-counter", "Girl Power", TargetType::SingleEnemy)
                .with_hit(StatKey::Atk, leveled(eidolon, 5, 1.00, 1.10), 10.0)
                .with_energy(COUNTER_EP),
        ),
        ..AbilitySet::default()
    };

    Unit::character(id, "March 7th", Element::Ice)
        .with_level(level)
        .with_eidolon(eidolon)
        .with_base_stat(StatKey::Hp, 1058.0)
        .with_base_stat(StatKey::Atk, 511.0)
        .with_base_stat(StatKey::Def, 573.0)
        .with_base_stat(StatKey::Spd, 101.0)
        .with_base_stat(StatKey::CritRate, 0.05)
        .with_base_stat(StatKey::CritDmg, 0.50)
        .with_base_stat(StatKey::Aggro, 150.0)
        .with_base_stat(StatKey::MaxEp, 120.0)
        .with_traces(vec![
            Trace::ability(TRACE_PURIFY),
            Trace::ability(TRACE_REINFORCE),
            Trace::ability(TRACE_ICE_SPELL),
            Trace::stat("march-7th-stat-ice", Modifier::add(StatKey::IceDmgBoost, 0.224)),
            Trace::stat("march-7th-stat-def", Modifier::multiply(StatKey::Def, 0.225)),
            Trace::stat("march-7th-stat-res", Modifier::add(StatKey::EffectRes, 0.10)),
        ])
        .with_abilities(abilities)
}

pub fn handler(id: &UnitId, _level: u32, eidolon: u8) -> Arc<dyn CombatHandler> {
    Arc::new(March7thHandler {
        id: format!("march-7th-handler:{id}"),
        unit: id.clone(),
        eidolon,
    })
}

fn frozen(source: &UnitId, eidolon: u8) -> Effect {
    Effect::debuff(frozen_id(source), "Frozen", source.clone())
        .turn_start_based(1)
        .with_tags(Capability::FREEZE | Capability::CLEANSABLE)
        .with_dot(
            DotKind::Frozen,
            DotDamage::Scaling {
                stat: StatKey::Atk,
                multiplier: leveled(eidolon, 3, 0.60, 0.66),
            },
        )
}

fn max_charges(eidolon: u8) -> u32 {
    if eidolon >= 4 { COUNTER_CHARGES + 1 } else { COUNTER_CHARGES }
}

struct March7thHandler {
    id: String,
    unit: UnitId,
    eidolon: u8,
}

const SUBSCRIPTIONS: &[EventKind] = &[
    EventKind::BattleStart,
    EventKind::TurnStart,
    EventKind::DamageDealt,
    EventKind::SkillUsed,
    EventKind::DebuffApplied,
];

impl CombatHandler for March7thHandler {
    fn id(&self) -> &str {
        &self.id
    }

    fn subscribed_events(&self) -> &[EventKind] {
        SUBSCRIPTIONS
    }

    fn handle(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        if !state.unit(&self.unit).is_some_and(Unit::is_alive) {
            return state;
        }
        match event.kind {
            EventKind::BattleStart => self.on_battle_start(state, ctx),
            EventKind::TurnStart => self.on_turn_start(event, state, ctx),
            EventKind::DamageDealt => self.on_damage_dealt(event, state, ctx),
            EventKind::SkillUsed if event.is_from(&self.unit) => self.on_skill(event, state, ctx),
            EventKind::DebuffApplied if self.eidolon >= 1 && event.is_from(&self.unit) => {
                self.on_debuff_applied(event, state, ctx)
            }
            _ => state,
        }
    }
}

impl March7thHandler {
    fn charges(&self) -> Effect {
        let max = max_charges(self.eidolon);
        Effect::buff(counter_charges_id(&self.unit), "Girl Power", self.unit.clone())
            .permanent()
            .with_stacks(max, max)
    }

    fn remaining_charges(&self, state: &GameState) -> u32 {
        state
            .unit(&self.unit)
            .and_then(|unit| unit.effect(&counter_charges_id(&self.unit)))
            .map_or(0, Effect::stack_count)
    }

    fn on_battle_start(&self, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let mut state = combat_core::effect::add_effect(state, &self.unit, self.charges());

        if self.eidolon >= 2 {
            let Some(me) = state.unit(&self.unit) else {
                return state;
            };
            let weakest = state
                .registry
                .alive_teammates_of(me)
                .into_iter()
                .min_by(|a, b| a.hp_ratio().total_cmp(&b.hp_ratio()))
                .map(|unit| unit.id.clone());
            if let Some(ally) = weakest {
                state = engine::apply_shield(state, ctx, &self.unit, &ally, &E2_SHIELD, SHIELD_DURATION);
            }
        }

        self.technique(state, ctx)
    }

    /// Technique: one random enemy starts the battle frozen.
    fn technique(&self, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let Some(me) = state.unit(&self.unit) else {
            return state;
        };
        let enemies: Vec<UnitId> = state
            .registry
            .alive_opponents_of(me)
            .into_iter()
            .map(|unit| unit.id.clone())
            .collect();
        if enemies.is_empty() {
            return state;
        }
        let target = enemies[ctx.rng.pick_index(enemies.len())].clone();
        let chance = state
            .unit(&target)
            .map_or(0.0, |enemy| combat::effect_hit_chance(TECHNIQUE_FREEZE_CHANCE, me, enemy));
        if !ctx.roll(chance) {
            return state;
        }

        let freeze = Effect::debuff(technique_frozen_id(&self.unit), "Frozen", self.unit.clone())
            .turn_start_based(1)
            .with_tags(Capability::FREEZE | Capability::CLEANSABLE)
            .with_dot(
                DotKind::Frozen,
                DotDamage::Scaling {
                    stat: StatKey::Atk,
                    multiplier: 0.50,
                },
            );
        let state = engine::grant_effect(state, ctx, &target, freeze);
        engine::log_detail(
            state,
            ctx,
            &self.unit,
            LogKind::BattleStart,
            LogDetail::Note(format!("technique froze {target}")),
        )
    }

    fn on_turn_start(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        if event.is_from(&self.unit) {
            return combat_core::effect::add_effect(state, &self.unit, self.charges());
        }
        if self.eidolon < 6 {
            return state;
        }
        let Some(ally) = state
            .unit(&event.source)
            .filter(|unit| unit.is_ally() && unit.has_effect(&shield_id(&self.unit)))
        else {
            return state;
        };
        let heal = SupportSpec {
            scaling: StatKey::Hp,
            multiplier: 0.0,
            flat: ally.max_hp() * E6_HEAL_RATIO + E6_HEAL_FLAT,
        };
        let ally = ally.id.clone();
        engine::apply_healing(state, ctx, &self.unit, &ally, &heal)
    }

    /// Counter an enemy whose direct hit landed on a shielded ally.
    fn on_damage_dealt(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let EventPayload::Damage {
            damage_kind: DamageKind::Direct,
            shield_absorbed,
            ..
        } = event.payload
        else {
            return state;
        };
        let Some(target) = event.target.as_ref() else {
            return state;
        };
        let attacker_is_enemy = state.unit(&event.source).is_some_and(Unit::is_enemy);
        let shielded = shield_absorbed > 0.0
            || state
                .unit(target)
                .is_some_and(|unit| unit.is_ally() && unit.shield > 0.0);
        let target_is_ally = state.unit(target).is_some_and(Unit::is_ally);
        if !attacker_is_enemy || !target_is_ally || !shielded {
            return state;
        }

        let charges = self.remaining_charges(&state);
        if charges == 0 || !ctx.credit(engine::Credit::one_time("march-7th-counter", &event.source)) {
            return state;
        }

        debug!(target: "combat::kits", unit = %self.unit, attacker = %event.source, charges, "march counter");
        let attacker = event.source.clone();
        let state = state.update_unit(&self.unit, |mut unit| {
            if let Some(stacks) = unit
                .effects
                .iter_mut()
                .find(|effect| effect.id == counter_charges_id(&self.unit))
                .and_then(|effect| effect.stacking.as_mut())
            {
                stacks.count = stacks.count.saturating_sub(1);
            }
            unit
        });
        state.enqueue_action(Action::follow_up(self.unit.clone()).targeting(attacker))
    }

    fn on_skill(&self, event: &Event, state: GameState, _ctx: &mut CombatContext<'_>) -> GameState {
        let purify = state
            .unit(&self.unit)
            .is_some_and(|unit| unit.has_trace(TRACE_PURIFY));
        match event.target.as_ref() {
            Some(target) if purify => combat_core::effect::cleanse(state, target, 1),
            _ => state,
        }
    }

    /// E1: energy for every enemy frozen by March.
    fn on_debuff_applied(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let EventPayload::Effect { effect } = &event.payload else {
            return state;
        };
        let froze = event
            .target
            .as_ref()
            .and_then(|target| state.unit(target))
            .and_then(|unit| unit.effect(effect))
            .is_some_and(|effect| effect.has(Capability::FREEZE));
        if !froze {
            return state;
        }
        engine::add_energy(state, ctx, &self.unit, 0.0, E1_ENERGY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::testing::{dummy, party_battle};
    use combat_core::{ElementSet, ScriptedRng};

    fn march() -> UnitId {
        UnitId::new("march")
    }

    fn ally() -> UnitId {
        UnitId::new("ally")
    }

    fn setup(eidolon: u8) -> GameState {
        let march_unit = build(march(), 80, eidolon).ready();
        let ally_unit = Unit::character(ally(), "Ally", Element::Fire)
            .with_base_stat(StatKey::Hp, 3000.0)
            .with_base_stat(StatKey::Atk, 500.0)
            .with_base_stat(StatKey::Def, 100.0)
            .with_base_stat(StatKey::Spd, 100.0)
            .with_base_stat(StatKey::MaxEp, 100.0)
            .ready();
        party_battle(
            vec![march_unit, ally_unit],
            vec![handler(&march(), 80, eidolon)],
            vec![dummy("e1", ElementSet::empty()), dummy("e2", ElementSet::empty())],
        )
    }

    fn charges(state: &GameState) -> u32 {
        state
            .unit(&march())
            .and_then(|unit| unit.effect(&counter_charges_id(&march())))
            .map_or(0, Effect::stack_count)
    }

    fn start(state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        engine::publish_event(state, ctx, Event::new(EventKind::BattleStart, UnitId::battle()))
    }

    #[test]
    fn ultimate_splits_its_multiplier_over_four_hits() {
        let unit = build(march(), 80, 0);
        let damage = unit.abilities.ultimate.as_ref().unwrap().damage.clone().unwrap();
        assert_eq!(damage.hits.len(), 4);
        assert!((damage.total_multiplier() - 1.50).abs() < 1e-9);
    }

    #[test]
    fn battle_start_grants_charges_and_technique_freeze() {
        let mut rng = ScriptedRng::always();
        let mut ctx = CombatContext::new(&mut rng);
        let state = start(setup(0), &mut ctx);

        assert_eq!(charges(&state), 2);
        let frozen = state
            .registry
            .alive_enemies()
            .iter()
            .filter(|unit| unit.has_effect(&technique_frozen_id(&march())))
            .count();
        assert_eq!(frozen, 1);
    }

    #[test]
    fn e4_adds_a_counter_charge() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = start(setup(4), &mut ctx);
        assert_eq!(charges(&state), 3);
    }

    #[test]
    fn enemy_hitting_a_shielded_ally_is_countered_once_per_action() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = start(setup(0), &mut ctx);
        let state = engine::dispatch(state, &mut ctx, Action::skill(march()).targeting(ally()));
        assert!(state.unit(&ally()).unwrap().shield > 0.0);

        let state = engine::dispatch(state, &mut ctx, Action::basic(UnitId::new("e1")).targeting(ally()));

        assert_eq!(
            state.pending_actions,
            vec![Action::follow_up(march()).targeting(UnitId::new("e1"))]
        );
        assert_eq!(charges(&state), 1);
    }

    #[test]
    fn unshielded_hits_are_not_countered() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = start(setup(0), &mut ctx);

        let state = engine::dispatch(state, &mut ctx, Action::basic(UnitId::new("e1")).targeting(ally()));
        assert!(state.pending_actions.is_empty());
        assert_eq!(charges(&state), 2);
    }

    #[test]
    fn own_turn_start_restores_charges() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = start(setup(0), &mut ctx).update_unit(&march(), |mut unit| {
            unit.effects.retain(|effect| effect.id != counter_charges_id(&march()));
            unit
        });
        assert_eq!(charges(&state), 0);

        let state = engine::publish_event(state, &mut ctx, Event::new(EventKind::TurnStart, march()));
        assert_eq!(charges(&state), 2);
    }

    #[test]
    fn skill_shield_lasts_an_extra_turn() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = engine::dispatch(setup(0), &mut ctx, Action::skill(march()).targeting(ally()));
        let shield = state.unit(&ally()).unwrap().effect(&shield_id(&march())).cloned().unwrap();
        assert_eq!(shield.duration, SHIELD_DURATION + 1);
    }

    #[test]
    fn e1_refunds_energy_per_frozen_enemy() {
        let mut rng = ScriptedRng::always();
        let mut ctx = CombatContext::new(&mut rng);
        let state = setup(1).update_unit(&march(), |mut unit| {
            unit.ep = unit.max_ep();
            unit
        });

        let state = engine::dispatch(state, &mut ctx, Action::ultimate(march()));

        // 5 from the ultimate, 6 flat for each of the two frozen enemies.
        let ep = state.unit(&march()).unwrap().ep;
        assert!((ep - 17.0).abs() < 1e-9);
    }
}
