//! Under the Blue Sky (Destruction).
//!
//! ATK up; defeating an enemy raises the wearer's crit rate for 3 turns.

use std::sync::Arc;

use combat_core::engine::{self, CombatContext};
use combat_core::{
    CombatHandler, Effect, EffectId, Event, EventKind, GameState, Modifier, ModifierOp, StatKey,
    Unit, UnitId,
};

use super::{LightCone, PassiveStat, rank};

pub const LIGHT_CONE: LightCone = LightCone {
    id: "under_the_blue_sky",
    name: "Under the Blue Sky",
    hp: 952.0,
    atk: 476.0,
    def: 330.0,
    passives: &[PassiveStat {
        stat: StatKey::Atk,
        op: ModifierOp::Multiply,
        values: [0.16, 0.20, 0.24, 0.28, 0.32],
    }],
    handler: Some(handler),
};

const CRIT_RATE: [f64; 5] = [0.12, 0.15, 0.18, 0.21, 0.24];
const CRIT_RATE_TURNS: i32 = 3;

pub fn crit_rate_id(wearer: &UnitId) -> EffectId {
    EffectId::new(format!("under-the-blue-sky-crit-rate:{wearer}"))
}

pub fn handler(wearer: &UnitId, superimposition: u8) -> Arc<dyn CombatHandler> {
    Arc::new(UnderTheBlueSky {
        id: format!("under-the-blue-sky:{wearer}"),
        wearer: wearer.clone(),
        superimposition,
    })
}

struct UnderTheBlueSky {
    id: String,
    wearer: UnitId,
    superimposition: u8,
}

impl CombatHandler for UnderTheBlueSky {
    fn id(&self) -> &str {
        &self.id
    }

    fn subscribed_events(&self) -> &[EventKind] {
        &[EventKind::EnemyDefeated]
    }

    fn handle(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        let alive = state.unit(&self.wearer).is_some_and(Unit::is_alive);
        if !alive || !event.is_from(&self.wearer) {
            return state;
        }
        let buff = Effect::buff(crit_rate_id(&self.wearer), LIGHT_CONE.name, self.wearer.clone())
            .turn_end_based(CRIT_RATE_TURNS)
            .skipping_first_decrement()
            .with_modifier(
                Modifier::add(StatKey::CritRate, rank(self.superimposition, CRIT_RATE)).with_source(LIGHT_CONE.name),
            );
        engine::grant_effect(state, ctx, &self.wearer, buff)
    }
}
