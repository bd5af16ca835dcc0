//! Sleep Like the Dead (The Hunt).
//!
//! CRIT DMG up. A basic attack or skill hit that fails to crit raises the
//! wearer's crit rate for 1 turn, then the passive rests for 3 turns.

use std::sync::Arc;

use combat_core::engine::{self, CombatContext};
use combat_core::{
    ActionKind, CombatHandler, DamageKind, Effect, EffectCategory, EffectId, Event, EventKind,
    GameState, Modifier, ModifierOp, StatKey, UnitId,
};
use tracing::debug;

use super::{LightCone, PassiveStat, rank};

pub const LIGHT_CONE: LightCone = LightCone {
    id: "sleep_like_the_dead",
    name: "Sleep Like the Dead",
    hp: 1058.0,
    atk: 582.0,
    def: 463.0,
    passives: &[PassiveStat {
        stat: StatKey::CritDmg,
        op: ModifierOp::Add,
        values: [0.30, 0.35, 0.40, 0.45, 0.50],
    }],
    handler: Some(handler),
};

const CRIT_RATE: [f64; 5] = [0.36, 0.42, 0.48, 0.54, 0.60];
const CRIT_RATE_TURNS: i32 = 1;
const COOLDOWN_TURNS: i32 = 3;

pub fn crit_rate_id(wearer: &UnitId) -> EffectId {
    EffectId::new(format!("sleep-like-the-dead-crit-rate:{wearer}"))
}

pub fn cooldown_id(wearer: &UnitId) -> EffectId {
    EffectId::new(format!("sleep-like-the-dead-cooldown:{wearer}"))
}

pub fn handler(wearer: &UnitId, superimposition: u8) -> Arc<dyn CombatHandler> {
    Arc::new(SleepLikeTheDead {
        id: format!("sleep-like-the-dead:{wearer}"),
        wearer: wearer.clone(),
        superimposition,
    })
}

struct SleepLikeTheDead {
    id: String,
    wearer: UnitId,
    superimposition: u8,
}

impl CombatHandler for SleepLikeTheDead {
    fn id(&self) -> &str {
        &self.id
    }

    fn subscribed_events(&self) -> &[EventKind] {
        &[EventKind::DamageDealt]
    }

    fn handle(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let ready = state
            .unit(&self.wearer)
            .is_some_and(|unit| unit.is_alive() && !unit.has_effect(&cooldown_id(&self.wearer)));
        let basic_or_skill = matches!(
            event.action,
            Some(ActionKind::Basic | ActionKind::EnhancedBasic | ActionKind::Skill)
        );
        let missed_crit = event.damage() == Some((DamageKind::Direct, false));
        if !ready || !event.is_from(&self.wearer) || !basic_or_skill || !missed_crit {
            return state;
        }

        debug!(target: "combat::light_cones", unit = %self.wearer, "sleep like the dead");
        let buff = Effect::buff(crit_rate_id(&self.wearer), LIGHT_CONE.name, self.wearer.clone())
            .turn_end_based(CRIT_RATE_TURNS)
            .with_modifier(
                Modifier::add(StatKey::CritRate, rank(self.superimposition, CRIT_RATE)).with_source(LIGHT_CONE.name),
            );
        let cooldown = Effect::new(
            cooldown_id(&self.wearer),
            "Sleep Like the Dead (cooldown)",
            self.wearer.clone(),
            EffectCategory::Other,
        )
        .turn_end_based(COOLDOWN_TURNS);

        let state = engine::grant_effect(state, ctx, &self.wearer, buff);
        engine::grant_effect(state, ctx, &self.wearer, cooldown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::testing::{battle, dummy};
    use combat_core::{Action, ElementSet, RandomSource, ScriptedRng};

    fn wearer() -> UnitId {
        UnitId::new("boothill")
    }

    fn setup() -> GameState {
        let unit = crate::kits::boothill::build(wearer(), 80, 0);
        battle(
            LIGHT_CONE.equip(unit, 1).ready(),
            handler(&wearer(), 1),
            vec![dummy("e1", ElementSet::empty())],
        )
    }

    fn basic(rng: &mut dyn RandomSource) -> GameState {
        let mut ctx = CombatContext::new(rng);
        engine::dispatch(setup(), &mut ctx, Action::basic(wearer()).targeting(UnitId::new("e1")))
    }

    #[test]
    fn non_crit_hit_grants_crit_rate_and_starts_cooldown() {
        let mut rng = ScriptedRng::never();
        let state = basic(&mut rng);

        let unit = state.unit(&wearer()).unwrap();
        assert_eq!(unit.effect(&crit_rate_id(&wearer())).map(|e| e.duration), Some(1));
        assert_eq!(unit.effect(&cooldown_id(&wearer())).map(|e| e.duration), Some(3));
        // 0.05 base + 0.36
        assert!((unit.stat(StatKey::CritRate) - 0.41).abs() < 1e-9);
    }

    #[test]
    fn crit_hits_do_not_trigger() {
        let mut rng = ScriptedRng::always();
        let state = basic(&mut rng);

        let unit = state.unit(&wearer()).unwrap();
        assert!(!unit.has_effect(&crit_rate_id(&wearer())));
        assert!(!unit.has_effect(&cooldown_id(&wearer())));
    }

    #[test]
    fn passive_raises_crit_damage() {
        let state = setup();
        // 0.50 base + 0.30
        assert!((state.unit(&wearer()).unwrap().stat(StatKey::CritDmg) - 0.80).abs() < 1e-9);
    }
}
