//! Yanqing (Ice, The Hunt).
//!
//! The skill grants Soulsteel Sync: extra crit, less aggro, and a chance to
//! follow every attack with a talent strike that may freeze. Soulsteel Sync
//! ends as soon as Yanqing actually loses HP.

use std::sync::Arc;

use combat_core::engine::{self, CombatContext};
use combat_core::{
    Ability, AbilityEffect, AbilitySet, Action, ActionKind, Capability, CombatHandler, DotDamage,
    DotKind, Effect, EffectId, EffectTarget, Element, Event, EventKind, GameState, Modifier,
    StatKey, TargetType, Trace, Unit, UnitId,
};
use tracing::debug;

use super::{Kit, leveled};

pub const KIT: Kit = Kit {
    id: "yanqing",
    name: "Yanqing",
    build,
    handler,
};

/// Additional Ice damage against Ice-weak enemies after each attack.
pub const TRACE_ICING: &str = "yanqing-trace-a2";
/// Effect RES while Soulsteel Sync is active.
pub const TRACE_FROST_FAVORS_THE_BRAVE: &str = "yanqing-trace-a4";
/// SPD boost after a critical hit.
pub const TRACE_GENTLE_BLADE: &str = "yanqing-trace-a6";

const BASIC_EP: f64 = 20.0;
const SKILL_EP: f64 = 30.0;
const ULT_EP: f64 = 5.0;
const FOLLOW_UP_EP: f64 = 10.0;

const FREEZE_CHANCE: f64 = 0.65;
const ULT_CRIT_RATE: f64 = 0.60;
const TECHNIQUE_DMG_BOOST: f64 = 0.30;
const TECHNIQUE_HP_THRESHOLD: f64 = 0.5;
const SOULSTEEL_AGGRO: f64 = -50.0;
const ICING_ATK_RATIO: f64 = 0.30;
const GENTLE_BLADE_SPD: f64 = 0.10;
const FROST_FAVORS_EFFECT_RES: f64 = 0.20;
const E1_ATK_RATIO: f64 = 0.60;
const E2_ENERGY_REGEN: f64 = 0.10;
const E4_HP_THRESHOLD: f64 = 0.8;
const E4_ICE_RES_PEN: f64 = 0.12;

pub fn soulsteel_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("yanqing-soulsteel:{unit}"))
}

pub fn ult_crit_rate_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("yanqing-ult-crit-rate:{unit}"))
}

pub fn ult_crit_dmg_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("yanqing-ult-crit-dmg:{unit}"))
}

pub fn technique_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("yanqing-technique:{unit}"))
}

pub fn frozen_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("yanqing-frozen:{unit}"))
}

fn gentle_blade_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("yanqing-gentle-blade:{unit}"))
}

pub fn build(id: UnitId, level: u32, eidolon: u8) -> Unit {
    let abilities = AbilitySet {
        basic: Some(
            Ability::new("yanqing-basic", "Frost Thorn", TargetType::SingleEnemy)
                .with_hit(StatKey::Atk, leveled(eidolon, 3, 1.00, 1.10), 10.0)
                .with_energy(BASIC_EP)
                .with_sp_gain(1),
        ),
        skill: Some(
            Ability::new("yanqing-skill", "Darting Ironthorn", TargetType::SingleEnemy)
                .with_hit(StatKey::Atk, leveled(eidolon, 3, 2.20, 2.42), 20.0)
                .with_energy(SKILL_EP)
                .with_sp_cost(1),
        ),
        ultimate: Some(
            Ability::new("yanqing-ultimate", "Amidst the Raining Bliss", TargetType::SingleEnemy)
                .with_hit(StatKey::Atk, leveled(eidolon, 5, 3.50, 3.78), 30.0)
                .with_energy(ULT_EP),
        ),
        follow_up: Some(
            Ability::new("yanqing-talent", "One With the Sword", TargetType::SingleEnemy)
                .with_hit(StatKey::Atk, leveled(eidolon, 5, 0.50, 0.55), 10.0)
                .with_energy(FOLLOW_UP_EP)
                .with_effect(
                    AbilityEffect::new(frozen(&id, eidolon), EffectTarget::Primary)
                        .with_chance(FREEZE_CHANCE),
                ),
        ),
        ..AbilitySet::default()
    };

    Unit::character(id, "Yanqing", Element::Ice)
        .with_level(level)
        .with_eidolon(eidolon)
        .with_base_stat(StatKey::Hp, 892.0)
        .with_base_stat(StatKey::Atk, 679.0)
        .with_base_stat(StatKey::Def, 412.0)
        .with_base_stat(StatKey::Spd, 109.0)
        .with_base_stat(StatKey::CritRate, 0.05)
        .with_base_stat(StatKey::CritDmg, 0.50)
        .with_base_stat(StatKey::Aggro, 75.0)
        .with_base_stat(StatKey::MaxEp, 140.0)
        .with_traces(vec![
            Trace::ability(TRACE_ICING),
            Trace::ability(TRACE_FROST_FAVORS_THE_BRAVE),
            Trace::ability(TRACE_GENTLE_BLADE),
            Trace::stat("yanqing-stat-atk", Modifier::multiply(StatKey::Atk, 0.28)),
            Trace::stat("yanqing-stat-ice", Modifier::add(StatKey::IceDmgBoost, 0.144)),
            Trace::stat("yanqing-stat-hp", Modifier::multiply(StatKey::Hp, 0.10)),
        ])
        .with_abilities(abilities)
}

pub fn handler(id: &UnitId, _level: u32, eidolon: u8) -> Arc<dyn CombatHandler> {
    Arc::new(YanqingHandler {
        id: format!("yanqing-handler:{id}"),
        unit: id.clone(),
        eidolon,
    })
}

/// Talent freeze: the frozen enemy skips its turn and takes Ice damage.
fn frozen(source: &UnitId, eidolon: u8) -> Effect {
    Effect::debuff(frozen_id(source), "Frozen", source.clone())
        .turn_start_based(1)
        .with_tags(Capability::FREEZE | Capability::CLEANSABLE)
        .with_dot(
            DotKind::Frozen,
            DotDamage::Scaling {
                stat: StatKey::Atk,
                multiplier: leveled(eidolon, 5, 0.50, 0.55),
            },
        )
}

fn soulsteel_sync(unit: &Unit) -> Effect {
    let eidolon = unit.eidolon;
    let mut effect = Effect::buff(soulsteel_id(&unit.id), "Soulsteel Sync", unit.id.clone())
        .turn_end_based(1)
        .skipping_first_decrement()
        .with_tags(Capability::REMOVED_ON_HP_LOSS | Capability::DISPELLABLE)
        .with_modifiers([
            Modifier::add(StatKey::CritRate, leveled(eidolon, 5, 0.20, 0.21)).with_source("Soulsteel Sync"),
            Modifier::add(StatKey::CritDmg, leveled(eidolon, 5, 0.30, 0.33)).with_source("Soulsteel Sync"),
            Modifier::add(StatKey::Aggro, SOULSTEEL_AGGRO).with_source("Soulsteel Sync"),
        ]);
    if eidolon >= 2 {
        effect = effect.with_modifier(
            Modifier::add(StatKey::EnergyRegenRate, E2_ENERGY_REGEN).with_source("E2"),
        );
    }
    if unit.has_trace(TRACE_FROST_FAVORS_THE_BRAVE) {
        effect = effect.with_modifier(
            Modifier::add(StatKey::EffectRes, FROST_FAVORS_EFFECT_RES).with_source("Frost Favors the Brave"),
        );
    }
    effect
}

struct YanqingHandler {
    id: String,
    unit: UnitId,
    eidolon: u8,
}

const SUBSCRIPTIONS: &[EventKind] = &[
    EventKind::BattleStart,
    EventKind::BeforeDamageCalculation,
    EventKind::DamageDealt,
    EventKind::UltimateUsed,
    EventKind::ActionComplete,
];

impl CombatHandler for YanqingHandler {
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
            EventKind::BeforeDamageCalculation if event.is_from(&self.unit) => {
                self.before_damage(event, state, ctx)
            }
            EventKind::DamageDealt if event.is_from(&self.unit) => self.on_damage_dealt(event, state, ctx),
            EventKind::UltimateUsed if event.is_from(&self.unit) => self.on_ultimate(state, ctx),
            EventKind::ActionComplete if event.is_from(&self.unit) => {
                self.on_action_complete(event, state, ctx)
            }
            _ => state,
        }
    }
}

impl YanqingHandler {
    /// Technique: bonus damage against healthy enemies for two turns.
    fn on_battle_start(&self, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let buff = Effect::buff(technique_id(&self.unit), "The One True Sword", self.unit.clone())
            .turn_end_based(2);
        engine::grant_effect(state, ctx, &self.unit, buff)
    }

    fn before_damage(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let (Some(me), Some(target)) = (
            state.unit(&self.unit),
            event.target.as_ref().and_then(|id| state.unit(id)),
        ) else {
            return state;
        };

        let mut dmg_boost = 0.0;
        let mut res_pen = 0.0;
        let mut crit_rate = 0.0;
        let mut crit_dmg = 0.0;

        if me.has_effect(&technique_id(&self.unit)) && target.hp_ratio() >= TECHNIQUE_HP_THRESHOLD {
            dmg_boost += TECHNIQUE_DMG_BOOST;
        }
        if self.eidolon >= 4 && me.hp_ratio() >= E4_HP_THRESHOLD {
            res_pen += E4_ICE_RES_PEN;
        }
        // The ultimate's own hit already benefits from the buffs it grants.
        if event.action == Some(ActionKind::Ultimate) && !me.has_effect(&ult_crit_rate_id(&self.unit)) {
            crit_rate += ULT_CRIT_RATE;
            if me.has_effect(&soulsteel_id(&self.unit)) {
                crit_dmg += leveled(self.eidolon, 5, 0.50, 0.54);
            }
        }

        if let Some(mods) = ctx.modifiers_mut() {
            mods.dmg_boost += dmg_boost;
            mods.res_pen += res_pen;
            mods.crit_rate += crit_rate;
            mods.crit_dmg += crit_dmg;
        }
        state
    }

    fn on_damage_dealt(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let crit = event.damage().is_some_and(|(_, is_crit)| is_crit);
        let has_trace = state
            .unit(&self.unit)
            .is_some_and(|unit| unit.has_trace(TRACE_GENTLE_BLADE));
        if !crit || !has_trace {
            return state;
        }
        let buff = Effect::buff(gentle_blade_id(&self.unit), "Gentle Blade", self.unit.clone())
            .turn_end_based(2)
            .skipping_first_decrement()
            .with_modifier(Modifier::multiply(StatKey::Spd, GENTLE_BLADE_SPD).with_source("Gentle Blade"));
        engine::grant_effect(state, ctx, &self.unit, buff)
    }

    fn on_ultimate(&self, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let synced = state
            .unit(&self.unit)
            .is_some_and(|unit| unit.has_effect(&soulsteel_id(&self.unit)));

        let crit_rate = Effect::buff(ult_crit_rate_id(&self.unit), "Amidst the Raining Bliss", self.unit.clone())
            .turn_end_based(1)
            .skipping_first_decrement()
            .with_modifier(Modifier::add(StatKey::CritRate, ULT_CRIT_RATE).with_source("Ultimate"));
        let mut state = engine::grant_effect(state, ctx, &self.unit, crit_rate);

        if synced {
            let crit_dmg = Effect::buff(ult_crit_dmg_id(&self.unit), "Amidst the Raining Bliss", self.unit.clone())
                .turn_end_based(1)
                .skipping_first_decrement()
                .with_modifier(
                    Modifier::add(StatKey::CritDmg, leveled(self.eidolon, 5, 0.50, 0.54)).with_source("Ultimate"),
                );
            state = engine::grant_effect(state, ctx, &self.unit, crit_dmg);
        }
        state
    }

    fn on_action_complete(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let Some(kind) = event.action else {
            return state;
        };
        let mut state = state;

        if kind == ActionKind::Skill {
            if let Some(me) = state.unit(&self.unit) {
                let sync = soulsteel_sync(me);
                state = engine::grant_effect(state, ctx, &self.unit, sync);
            }
        }

        let Some(target) = event
            .target
            .clone()
            .filter(|id| state.unit(id).is_some_and(Unit::is_enemy))
        else {
            return state;
        };

        if kind == ActionKind::Ultimate && self.eidolon >= 6 {
            let defeated = state.unit(&target).is_some_and(|unit| !unit.is_alive());
            if defeated {
                state = self.extend_ultimate_buffs(state);
            }
        }

        ctx.reset_modifiers();
        state = self.after_attack(state, ctx, &target);

        if kind == ActionKind::FollowUp {
            return state;
        }
        let synced = state
            .unit(&self.unit)
            .is_some_and(|unit| unit.has_effect(&soulsteel_id(&self.unit)));
        let target_alive = state.unit(&target).is_some_and(Unit::is_alive);
        if synced && target_alive && ctx.roll(leveled(self.eidolon, 5, 0.60, 0.62)) {
            debug!(target: "combat::kits", unit = %self.unit, target = %target, "yanqing follow-up");
            state = state.enqueue_action(Action::follow_up(self.unit.clone()).targeting(target));
        }
        state
    }

    /// Icing and E1 additional damage after every attack.
    fn after_attack(&self, state: GameState, ctx: &mut CombatContext<'_>, target: &UnitId) -> GameState {
        let (Some(me), Some(enemy)) = (state.unit(&self.unit), state.unit(target)) else {
            return state;
        };
        let atk = me.stat(StatKey::Atk);
        let icing = me.has_trace(TRACE_ICING) && enemy.weaknesses.has(Element::Ice);
        let frozen = self.eidolon >= 1 && enemy.has_capability(Capability::FREEZE);

        let mut state = state;
        if icing {
            state = engine::deal_additional_damage(state, ctx, &self.unit, target, atk * ICING_ATK_RATIO, "Icing");
        }
        if frozen {
            state = engine::deal_additional_damage(state, ctx, &self.unit, target, atk * E1_ATK_RATIO, "E1");
        }
        state
    }

    fn extend_ultimate_buffs(&self, state: GameState) -> GameState {
        let buffs = [ult_crit_rate_id(&self.unit), ult_crit_dmg_id(&self.unit)];
        state.update_unit(&self.unit, |mut unit| {
            for effect in unit.effects.iter_mut().filter(|effect| buffs.contains(&effect.id)) {
                effect.duration += 1;
            }
            unit
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::testing::{battle, dummy};
    use combat_core::{ElementSet, ScriptedRng};

    fn yanqing_id() -> UnitId {
        UnitId::new("yanqing")
    }

    fn setup(eidolon: u8, weaknesses: ElementSet) -> GameState {
        let unit = build(yanqing_id(), 80, eidolon).ready();
        battle(unit, handler(&yanqing_id(), 80, eidolon), vec![dummy("e1", weaknesses)])
    }

    #[test]
    fn eidolons_raise_ability_levels() {
        let base = build(yanqing_id(), 80, 0);
        let boosted = build(yanqing_id(), 80, 5);
        let skill = |unit: &Unit| unit.abilities.skill.as_ref().unwrap().damage.as_ref().unwrap().hits[0].multiplier;
        let ult = |unit: &Unit| unit.abilities.ultimate.as_ref().unwrap().damage.as_ref().unwrap().hits[0].multiplier;
        assert_eq!(skill(&base), 2.20);
        assert_eq!(skill(&boosted), 2.42);
        assert_eq!(ult(&base), 3.50);
        assert_eq!(ult(&boosted), 3.78);
    }

    #[test]
    fn skill_grants_soulsteel_and_queues_follow_up() {
        let mut rng = ScriptedRng::always();
        let mut ctx = CombatContext::new(&mut rng);
        let state = engine::dispatch(setup(0, ElementSet::empty()), &mut ctx, Action::skill(yanqing_id()));

        let me = state.unit(&yanqing_id()).unwrap();
        let sync = me.effect(&soulsteel_id(&yanqing_id())).unwrap();
        assert!(sync.has(Capability::REMOVED_ON_HP_LOSS));
        // 0.05 base + 0.20 talent
        assert!((me.stat(StatKey::CritRate) - 0.25).abs() < 1e-9);
        assert_eq!(state.pending_actions, vec![Action::follow_up(yanqing_id()).targeting(UnitId::new("e1"))]);
    }

    #[test]
    fn failed_roll_queues_nothing() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = engine::dispatch(setup(0, ElementSet::empty()), &mut ctx, Action::skill(yanqing_id()));
        assert!(state.pending_actions.is_empty());
    }

    #[test]
    fn basic_without_soulsteel_never_follows_up() {
        let mut rng = ScriptedRng::always();
        let mut ctx = CombatContext::new(&mut rng);
        let state = engine::dispatch(setup(0, ElementSet::empty()), &mut ctx, Action::basic(yanqing_id()));
        assert!(state.pending_actions.is_empty());
    }

    #[test]
    fn follow_up_freezes_and_triggers_icing() {
        let mut rng = ScriptedRng::always();
        let mut ctx = CombatContext::new(&mut rng);
        let state = setup(0, ElementSet::from_iter([Element::Ice]));
        let hp_before = state.unit(&UnitId::new("e1")).unwrap().hp;

        let state = engine::dispatch(state, &mut ctx, Action::follow_up(yanqing_id()).targeting(UnitId::new("e1")));

        let enemy = state.unit(&UnitId::new("e1")).unwrap();
        assert!(enemy.has_effect(&frozen_id(&yanqing_id())));
        assert!(enemy.hp < hp_before);
        let entry = state.log.last().unwrap();
        assert!(entry.details.iter().any(|detail| matches!(
            detail,
            combat_core::LogDetail::Damage { label, .. } if label == "Icing"
        )));
        // follow-ups never chain
        assert!(state.pending_actions.is_empty());
    }

    #[test]
    fn ultimate_buffs_apply_to_its_own_hit() {
        let mut rng = ScriptedRng::new([0.5]);
        let mut ctx = CombatContext::new(&mut rng);
        let state = setup(0, ElementSet::empty()).update_unit(&yanqing_id(), |mut unit| {
            unit.ep = unit.max_ep();
            unit
        });

        let state = engine::dispatch(state, &mut ctx, Action::ultimate(yanqing_id()));

        // 0.05 + 0.60 > 0.5, so the roll of 0.5 crits
        let dealt = state.log.last().unwrap().details.iter().any(|detail| matches!(
            detail,
            combat_core::LogDetail::Damage { is_crit: true, .. }
        ));
        assert!(dealt);
        assert!(state.unit(&yanqing_id()).unwrap().has_effect(&ult_crit_rate_id(&yanqing_id())));
    }

    #[test]
    fn technique_buff_is_granted_at_battle_start() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = engine::publish_event(
            setup(0, ElementSet::empty()),
            &mut ctx,
            Event::new(EventKind::BattleStart, UnitId::battle()),
        );
        let buff = state.unit(&yanqing_id()).unwrap().effect(&technique_id(&yanqing_id())).cloned().unwrap();
        assert_eq!(buff.duration, 2);
    }
}
