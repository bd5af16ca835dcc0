//! Boothill (Physical, The Hunt).
//!
//! The skill locks Boothill and one enemy into a Standoff: both must target
//! each other, Boothill's basic attack is enhanced and his turn continues.
//! Breaking the Standoff target earns Pocket Trickshot stacks, which add
//! toughness damage and break damage to later enhanced basic attacks.

use std::sync::Arc;

use combat_core::engine::{self, CombatContext, Credit, DamageOptions, ShiftMode};
use combat_core::{
    Ability, AbilitySet, ActionKind, Capability, CombatHandler, DamageKind, DamageSpec, Effect,
    EffectHook, EffectId, Element, Event, EventKind, GameState, HitSpec, Modifier, StatKey,
    TargetType, Trace, TurnOverride, Unit, UnitId, combat, effect,
};
use tracing::debug;

use super::{Kit, leveled};

pub const KIT: Kit = Kit {
    id: "boothill",
    name: "Boothill",
    build,
    handler,
};

/// Crit rate and crit damage from Break Effect.
pub const TRACE_GHOST_LOAD: &str = "boothill-trace-a2";
/// Less damage taken from enemies outside the Standoff.
pub const TRACE_ABOVE_SNAKES: &str = "boothill-trace-a4";
/// Energy when the Standoff target is broken.
pub const TRACE_POINT_BLANK: &str = "boothill-trace-a6";

const BASIC_EP: f64 = 20.0;
const ENHANCED_BASIC_EP: f64 = 30.0;
const ULT_EP: f64 = 5.0;

const ENHANCED_BASIC_HITS: usize = 6;
const ENHANCED_BASIC_TOUGHNESS: f64 = 20.0;
const STANDOFF_DURATION: i32 = 2;
const STANDOFF_SELF_VULN: f64 = 0.15;
const ULT_WEAKNESS_DURATION: i32 = 2;
const MAX_POCKET: u32 = 3;
/// Each stack adds 10 toughness damage over the whole enhanced basic attack.
const POCKET_TOUGHNESS_PER_STACK: f64 = 10.0;

const GHOST_LOAD_CRIT_RATE: (f64, f64) = (0.10, 0.30);
const GHOST_LOAD_CRIT_DMG: (f64, f64) = (0.50, 1.50);
const ABOVE_SNAKES_REDUCTION: f64 = 0.30;
const POINT_BLANK_ENERGY: f64 = 10.0;
const E1_DEF_IGNORE: f64 = 0.16;
const E2_BREAK_EFFECT: f64 = 0.30;
const E4_DMG_BOOST: f64 = 0.12;
const E4_SELF_VULN_REDUCTION: f64 = 0.12;
const E6_MAIN_BONUS: f64 = 0.40;
const E6_ADJACENT_RATIO: f64 = 0.70;

pub fn standoff_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("boothill-standoff:{unit}"))
}

pub fn standoff_target_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("boothill-standoff-target:{unit}"))
}

pub fn pocket_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("boothill-pocket-trickshot:{unit}"))
}

pub fn physical_weakness_id(unit: &UnitId, target: &UnitId) -> EffectId {
    EffectId::new(format!("boothill-physical-weakness:{unit}:{target}"))
}

fn technique_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("boothill-technique:{unit}"))
}

fn e2_break_effect_id(unit: &UnitId) -> EffectId {
    EffectId::new(format!("boothill-e2-break-effect:{unit}"))
}

pub fn build(id: UnitId, level: u32, eidolon: u8) -> Unit {
    let enhanced_total = leveled(eidolon, 3, 2.20, 2.42);
    let enhanced_hit = HitSpec::new(
        enhanced_total / ENHANCED_BASIC_HITS as f64,
        ENHANCED_BASIC_TOUGHNESS / ENHANCED_BASIC_HITS as f64,
    );
    let basic_hit = HitSpec::new(leveled(eidolon, 3, 0.50, 0.55), 5.0);
    let ult_hit = HitSpec::new(leveled(eidolon, 3, 2.00, 2.16), 15.0);

    let abilities = AbilitySet {
        basic: Some(
            Ability::new("boothill-basic", "Skullcrush Spurs", TargetType::SingleEnemy)
                .with_damage(DamageSpec::new(StatKey::Atk, vec![basic_hit; 2]))
                .with_energy(BASIC_EP)
                .with_sp_gain(1),
        ),
        enhanced_basic: Some(
            Ability::new("boothill-enhanced-basic", "Fanning the Hammer", TargetType::SingleEnemy)
                .with_damage(DamageSpec::new(StatKey::Atk, vec![enhanced_hit; ENHANCED_BASIC_HITS]))
                .with_energy(ENHANCED_BASIC_EP),
        ),
        skill: Some(Ability::new(
            "boothill-skill",
            "Sizzlin' Tango",
            TargetType::SingleEnemy,
        )),
        ultimate: Some(
            Ability::new("boothill-ultimate", "Dust Devil's Sunset Rodeo", TargetType::SingleEnemy)
                .with_damage(DamageSpec::new(StatKey::Atk, vec![ult_hit; 2]))
                .with_energy(ULT_EP),
        ),
        ..AbilitySet::default()
    };

    Unit::character(id, "Boothill", Element::Physical)
        .with_level(level)
        .with_eidolon(eidolon)
        .with_base_stat(StatKey::Hp, 1203.0)
        .with_base_stat(StatKey::Atk, 620.0)
        .with_base_stat(StatKey::Def, 436.0)
        .with_base_stat(StatKey::Spd, 107.0)
        .with_base_stat(StatKey::CritRate, 0.05)
        .with_base_stat(StatKey::CritDmg, 0.50)
        .with_base_stat(StatKey::Aggro, 75.0)
        .with_base_stat(StatKey::MaxEp, 115.0)
        .with_traces(vec![
            Trace::ability(TRACE_GHOST_LOAD),
            Trace::ability(TRACE_ABOVE_SNAKES),
            Trace::ability(TRACE_POINT_BLANK),
            Trace::stat("boothill-stat-break", Modifier::add(StatKey::BreakEffect, 0.373)),
            Trace::stat("boothill-stat-atk", Modifier::multiply(StatKey::Atk, 0.18)),
            Trace::stat("boothill-stat-hp", Modifier::multiply(StatKey::Hp, 0.10)),
        ])
        .with_abilities(abilities)
}

pub fn handler(id: &UnitId, _level: u32, eidolon: u8) -> Arc<dyn CombatHandler> {
    Arc::new(BoothillHandler {
        id: format!("boothill-handler:{id}"),
        unit: id.clone(),
        eidolon,
    })
}

/// Talent break damage multiplier for `stacks` Pocket Trickshot stacks.
fn trickshot_multiplier(eidolon: u8, stacks: u32) -> f64 {
    let table = if eidolon >= 5 {
        [0.77, 1.32, 1.87]
    } else {
        [0.70, 1.20, 1.70]
    };
    match stacks {
        0 => 0.0,
        n => table[(n.min(MAX_POCKET) - 1) as usize],
    }
}

struct BoothillHandler {
    id: String,
    unit: UnitId,
    eidolon: u8,
}

const SUBSCRIPTIONS: &[EventKind] = &[
    EventKind::BattleStart,
    EventKind::SkillUsed,
    EventKind::UltimateUsed,
    EventKind::BeforeDamageCalculation,
    EventKind::AfterHit,
    EventKind::WeaknessBreak,
    EventKind::EnemyDefeated,
];

impl CombatHandler for BoothillHandler {
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
        let standoff = self.standoff_target(&state);
        match event.kind {
            EventKind::BattleStart => self.on_battle_start(state),
            EventKind::SkillUsed if event.is_from(&self.unit) && standoff.is_none() => {
                self.start_standoff(event, state, ctx)
            }
            EventKind::UltimateUsed if event.is_from(&self.unit) => self.on_ultimate(event, state),
            EventKind::BeforeDamageCalculation if event.is_from(&self.unit) => {
                self.before_attack(event, state, ctx, standoff.as_ref())
            }
            EventKind::BeforeDamageCalculation if event.targets(&self.unit) => {
                self.before_hit_taken(event, state, ctx, standoff.as_ref())
            }
            EventKind::AfterHit
                if event.is_from(&self.unit) && event.action == Some(ActionKind::EnhancedBasic) =>
            {
                self.pocket_trickshot(event, state, ctx)
            }
            EventKind::WeaknessBreak
                if standoff.is_some() && event.is_from(&self.unit) && event.target == standoff =>
            {
                self.on_standoff_break(state, ctx)
            }
            EventKind::EnemyDefeated if standoff.is_some() && event.target == standoff => {
                self.end_standoff(state, ctx)
            }
            _ => state,
        }
    }
}

impl BoothillHandler {
    /// Enemy locked in the Standoff, the source of Boothill's own taunt.
    fn standoff_target(&self, state: &GameState) -> Option<UnitId> {
        state
            .unit(&self.unit)?
            .effect(&standoff_id(&self.unit))
            .map(|effect| effect.source.clone())
    }

    fn pocket(&self, state: &GameState) -> u32 {
        state
            .unit(&self.unit)
            .and_then(|unit| unit.effect(&pocket_id(&self.unit)))
            .map_or(0, Effect::stack_count)
    }

    fn gain_pocket(&self, state: GameState) -> GameState {
        let stack = Effect::buff(pocket_id(&self.unit), "Pocket Trickshot", self.unit.clone())
            .permanent()
            .with_stacks(1, MAX_POCKET);
        effect::add_effect(state, &self.unit, stack)
    }

    fn on_battle_start(&self, state: GameState) -> GameState {
        let flag = Effect::buff(technique_id(&self.unit), "3-9× Smile", self.unit.clone()).permanent();
        let state = effect::add_effect(state, &self.unit, flag);
        if self.eidolon >= 1 {
            self.gain_pocket(state)
        } else {
            state
        }
    }

    fn start_standoff(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let Some(target) = event
            .target
            .clone()
            .filter(|id| state.unit(id).is_some_and(|unit| unit.is_enemy() && unit.is_alive()))
        else {
            return state;
        };
        let mut state = state;

        // Technique: the first Standoff target becomes weak to Physical.
        let technique = state
            .unit(&self.unit)
            .is_some_and(|unit| unit.has_effect(&technique_id(&self.unit)));
        if technique {
            state = self.grant_physical_weakness(state, ctx, &target);
            state = effect::remove_effect(state, &self.unit, &technique_id(&self.unit));
        }

        let mut self_vuln = STANDOFF_SELF_VULN;
        if self.eidolon >= 4 {
            self_vuln -= E4_SELF_VULN_REDUCTION;
        }
        let duel = Effect::buff(standoff_id(&self.unit), "Standoff", target.clone())
            .turn_end_based(STANDOFF_DURATION)
            .skipping_first_decrement()
            .with_tags(Capability::ENHANCED_BASIC | Capability::SKILL_SILENCE | Capability::TAUNT)
            .with_modifier(Modifier::add(StatKey::AllTypeVuln, self_vuln).with_source("Standoff"));
        let taunt = Effect::debuff(standoff_target_id(&self.unit), "Standoff", self.unit.clone())
            .permanent()
            .linked_to(standoff_id(&self.unit))
            .with_tags(Capability::TAUNT)
            .with_modifier(
                Modifier::add(StatKey::AllTypeVuln, leveled(self.eidolon, 5, 0.30, 0.33)).with_source("Standoff"),
            );

        debug!(target: "combat::kits", unit = %self.unit, target = %target, "standoff");
        state = engine::grant_effect(state, ctx, &self.unit, duel);
        state = engine::grant_effect(state, ctx, &target, taunt);
        state.turn_override = Some(TurnOverride {
            unit: self.unit.clone(),
            extra_actions: 1,
        });
        state
    }

    fn grant_physical_weakness(&self, state: GameState, ctx: &mut CombatContext<'_>, target: &UnitId) -> GameState {
        let weakness = Effect::debuff(physical_weakness_id(&self.unit, target), "Physical Weakness", self.unit.clone())
            .turn_start_based(ULT_WEAKNESS_DURATION)
            .with_hook(EffectHook::grant_weakness(Element::Physical));
        engine::grant_effect(state, ctx, target, weakness)
    }

    fn end_standoff(&self, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        engine::revoke_effect(state, ctx, &self.unit, &standoff_id(&self.unit))
    }

    fn on_ultimate(&self, event: &Event, state: GameState) -> GameState {
        match event.target.as_ref() {
            Some(target) => engine::delay_action(
                state,
                target,
                leveled(self.eidolon, 3, 0.40, 0.42),
                ShiftMode::Percent,
            ),
            None => state,
        }
    }

    fn before_attack(
        &self,
        event: &Event,
        state: GameState,
        ctx: &mut CombatContext<'_>,
        standoff: Option<&UnitId>,
    ) -> GameState {
        let Some(target) = event.target.clone() else {
            return state;
        };
        let mut state = state;

        // The ultimate makes its target weak to Physical before the first hit lands.
        if event.action == Some(ActionKind::Ultimate)
            && ctx.credit(Credit::one_time("boothill-ultimate-weakness", &target))
        {
            state = self.grant_physical_weakness(state, ctx, &target);
        }

        let Some(me) = state.unit(&self.unit) else {
            return state;
        };
        let break_effect = me.stat(StatKey::BreakEffect);
        let ghost_load = me.has_trace(TRACE_GHOST_LOAD);
        let pocket = self.pocket(&state);

        if let Some(mods) = ctx.modifiers_mut() {
            if self.eidolon >= 1 {
                mods.def_ignore += E1_DEF_IGNORE;
            }
            if self.eidolon >= 4 && standoff == Some(&target) {
                mods.dmg_boost += E4_DMG_BOOST;
            }
            if ghost_load {
                mods.crit_rate += (break_effect * GHOST_LOAD_CRIT_RATE.0).min(GHOST_LOAD_CRIT_RATE.1);
                mods.crit_dmg += (break_effect * GHOST_LOAD_CRIT_DMG.0).min(GHOST_LOAD_CRIT_DMG.1);
            }
            if event.action == Some(ActionKind::EnhancedBasic) && pocket > 0 {
                mods.break_efficiency += POCKET_TOUGHNESS_PER_STACK * f64::from(pocket) / ENHANCED_BASIC_TOUGHNESS;
            }
        }
        state
    }

    fn before_hit_taken(
        &self,
        event: &Event,
        state: GameState,
        ctx: &mut CombatContext<'_>,
        standoff: Option<&UnitId>,
    ) -> GameState {
        let above_snakes = state
            .unit(&self.unit)
            .is_some_and(|unit| unit.has_trace(TRACE_ABOVE_SNAKES));
        let outsider = standoff.is_some_and(|target| target != &event.source);
        if above_snakes && outsider {
            if let Some(mods) = ctx.modifiers_mut() {
                mods.vuln -= ABOVE_SNAKES_REDUCTION;
            }
        }
        state
    }

    /// Talent: enhanced basic hits on a broken enemy deal break damage,
    /// once per target per action.
    fn pocket_trickshot(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let Some(target) = event.target.clone() else {
            return state;
        };
        let stacks = self.pocket(&state);
        let broken = state.unit(&target).is_some_and(|unit| unit.is_alive() && unit.is_broken());
        if stacks == 0 || !broken || !ctx.credit(Credit::one_time("boothill-pocket-trickshot", &target)) {
            return state;
        }

        let mut multiplier = trickshot_multiplier(self.eidolon, stacks);
        if self.eidolon >= 6 {
            multiplier *= 1.0 + E6_MAIN_BONUS;
        }
        let mut state = self.break_hit(state, ctx, &target, multiplier);

        if self.eidolon >= 6 {
            let base = trickshot_multiplier(self.eidolon, stacks);
            for neighbour in adjacent_enemies(&state, &target) {
                state = self.break_hit(state, ctx, &neighbour, base * E6_ADJACENT_RATIO);
            }
        }
        state
    }

    fn break_hit(&self, state: GameState, ctx: &mut CombatContext<'_>, target: &UnitId, multiplier: f64) -> GameState {
        let damage = match (state.unit(&self.unit), state.unit(target)) {
            (Some(me), Some(enemy)) if enemy.is_alive() => {
                combat::calculate_break_damage_with_breakdown(me, enemy).0 * multiplier
            }
            _ => return state,
        };
        engine::apply_unified_damage(
            state,
            ctx,
            &self.unit,
            target,
            damage,
            DamageOptions::new(DamageKind::Break, "Pocket Trickshot"),
        )
        .0
    }

    fn on_standoff_break(&self, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let mut state = self.gain_pocket(state);

        let point_blank = state
            .unit(&self.unit)
            .is_some_and(|unit| unit.has_trace(TRACE_POINT_BLANK));
        if point_blank {
            state = engine::add_energy(state, ctx, &self.unit, 0.0, POINT_BLANK_ENERGY);
        }
        if self.eidolon >= 2 {
            state = state.gain_skill_points(1);
            let boost = Effect::buff(e2_break_effect_id(&self.unit), "Milestonemonger", self.unit.clone())
                .turn_end_based(2)
                .skipping_first_decrement()
                .with_modifier(Modifier::add(StatKey::BreakEffect, E2_BREAK_EFFECT).with_source("E2"));
            state = engine::grant_effect(state, ctx, &self.unit, boost);
        }
        self.end_standoff(state, ctx)
    }
}

/// Living enemies next to `target` in lineup order.
fn adjacent_enemies(state: &GameState, target: &UnitId) -> Vec<UnitId> {
    let enemies: Vec<UnitId> = state
        .registry
        .alive_enemies()
        .into_iter()
        .map(|unit| unit.id.clone())
        .collect();
    let Some(center) = enemies.iter().position(|id| id == target) else {
        return Vec::new();
    };
    [center.checked_sub(1), Some(center + 1)]
        .into_iter()
        .flatten()
        .filter_map(|index| enemies.get(index).cloned())
        .collect()
}
