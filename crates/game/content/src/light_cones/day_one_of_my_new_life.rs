//! Day One of My New Life (Preservation).
//!
//! DEF up; from battle start every ally gains All-Type RES while the wearer
//! stands.

use std::sync::Arc;

use combat_core::engine::CombatContext;
use combat_core::{
    Aura, AuraTarget, CombatHandler, EffectId, Element, Event, EventKind, GameState, Modifier,
    ModifierOp, StatKey, Unit, UnitId, effect,
};
use strum::IntoEnumIterator;

use super::{LightCone, PassiveStat, rank};

pub const LIGHT_CONE: LightCone = LightCone {
    id: "day_one_of_my_new_life",
    name: "Day One of My New Life",
    hp: 952.0,
    atk: 370.0,
    def: 463.0,
    passives: &[PassiveStat {
        stat: StatKey::Def,
        op: ModifierOp::Multiply,
        values: [0.16, 0.18, 0.20, 0.22, 0.24],
    }],
    handler: Some(handler),
};

const ALL_TYPE_RES: [f64; 5] = [0.08, 0.09, 0.10, 0.11, 0.12];

pub fn aura_id(wearer: &UnitId) -> EffectId {
    EffectId::new(format!("day-one-of-my-new-life:{wearer}"))
}

pub fn handler(wearer: &UnitId, superimposition: u8) -> Arc<dyn CombatHandler> {
    Arc::new(DayOne {
        id: format!("day-one-of-my-new-life:{wearer}"),
        wearer: wearer.clone(),
        superimposition,
    })
}

struct DayOne {
    id: String,
    wearer: UnitId,
    superimposition: u8,
}

impl CombatHandler for DayOne {
    fn id(&self) -> &str {
        &self.id
    }

    fn subscribed_events(&self) -> &[EventKind] {
        &[EventKind::BattleStart]
    }

    fn handle(&self, _: &Event, state: GameState, _: &mut CombatContext<'_>) -> GameState {
        if !state.unit(&self.wearer).is_some_and(Unit::is_alive) {
            return state;
        }
        let res = rank(self.superimposition, ALL_TYPE_RES);
        let aura = Element::iter().fold(
            Aura::new(aura_id(&self.wearer), LIGHT_CONE.name, self.wearer.clone(), AuraTarget::AllAllies),
            |aura, element| aura.with_modifier(Modifier::add(element.res_stat(), res).with_source(LIGHT_CONE.name)),
        );
        effect::add_aura(state, aura)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::testing::{dummy, party_battle};
    use combat_core::engine;
    use combat_core::{ElementSet, ScriptedRng};

    #[test]
    fn every_ally_gains_resistance() {
        let wearer = UnitId::new("march");
        let march = crate::kits::march_7th::build(wearer.clone(), 80, 0);
        let march = LIGHT_CONE.equip(march, 5).ready();
        let yanqing = crate::kits::yanqing::build(UnitId::new("yanqing"), 80, 0).ready();
        let state = party_battle(
            vec![march, yanqing],
            vec![handler(&wearer, 5)],
            vec![dummy("e1", ElementSet::empty())],
        );
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);

        let state = engine::publish_event(state, &mut ctx, Event::new(EventKind::BattleStart, UnitId::battle()));

        let yanqing = state.unit(&UnitId::new("yanqing")).unwrap();
        for element in Element::iter() {
            assert!((yanqing.stat(element.res_stat()) - 0.12).abs() < 1e-9);
        }
        assert!(state.unit(&UnitId::new("e1")).unwrap().auras.is_empty());
    }
}
