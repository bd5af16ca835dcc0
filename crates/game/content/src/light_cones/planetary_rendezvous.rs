//! Planetary Rendezvous (Harmony).
//!
//! From battle start, allies sharing the wearer's element deal more damage of
//! that element while the wearer stands.

use std::sync::Arc;

use combat_core::engine::CombatContext;
use combat_core::{
    Aura, AuraTarget, CombatHandler, EffectId, Event, EventKind, GameState, Modifier, UnitId, effect,
};
use tracing::debug;

use super::{LightCone, rank};

pub const LIGHT_CONE: LightCone = LightCone {
    id: "planetary_rendezvous",
    name: "Planetary Rendezvous",
    hp: 1058.0,
    atk: 423.0,
    def: 330.0,
    passives: &[],
    handler: Some(handler),
};

const DMG_BOOST: [f64; 5] = [0.12, 0.15, 0.18, 0.21, 0.24];

pub fn aura_id(wearer: &UnitId) -> EffectId {
    EffectId::new(format!("planetary-rendezvous:{wearer}"))
}

pub fn handler(wearer: &UnitId, superimposition: u8) -> Arc<dyn CombatHandler> {
    Arc::new(PlanetaryRendezvous {
        id: format!("planetary-rendezvous:{wearer}"),
        wearer: wearer.clone(),
        superimposition,
    })
}

struct PlanetaryRendezvous {
    id: String,
    wearer: UnitId,
    superimposition: u8,
}

impl CombatHandler for PlanetaryRendezvous {
    fn id(&self) -> &str {
        &self.id
    }

    fn subscribed_events(&self) -> &[EventKind] {
        &[EventKind::BattleStart]
    }

    fn handle(&self, _: &Event, state: GameState, _: &mut CombatContext<'_>) -> GameState {
        let Some(element) = state
            .unit(&self.wearer)
            .filter(|unit| unit.is_alive())
            .map(|unit| unit.element)
        else {
            return state;
        };
        debug!(target: "combat::light_cones", unit = %self.wearer, element = %element, "planetary rendezvous");
        let aura = Aura::new(aura_id(&self.wearer), LIGHT_CONE.name, self.wearer.clone(), AuraTarget::AllAllies)
            .for_element(element)
            .with_modifier(
                Modifier::add(element.dmg_boost_stat(), rank(self.superimposition, DMG_BOOST))
                    .with_source(LIGHT_CONE.name),
            );
        effect::add_aura(state, aura)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::testing::{dummy, party_battle};
    use combat_core::engine::{self, DamageOptions};
    use combat_core::{DamageKind, Element, ElementSet, ScriptedRng, StatKey, Unit};

    fn wearer() -> UnitId {
        UnitId::new("w")
    }

    fn ally(id: &str, element: Element) -> Unit {
        Unit::character(UnitId::new(id), id, element)
            .with_base_stat(StatKey::Hp, 1000.0)
            .with_base_stat(StatKey::Atk, 500.0)
    }

    fn setup() -> GameState {
        let unit = LIGHT_CONE.equip(ally("w", Element::Ice), 1).ready();
        party_battle(
            vec![unit, ally("ice", Element::Ice).ready(), ally("fire", Element::Fire).ready()],
            vec![handler(&wearer(), 1)],
            vec![dummy("e1", ElementSet::empty())],
        )
    }

    fn start(state: GameState, ctx: &mut CombatContext<'_>) -> GameState {
        engine::publish_event(state, ctx, Event::new(EventKind::BattleStart, UnitId::battle()))
    }

    fn ice_boost(state: &GameState, id: &str) -> f64 {
        state.unit(&UnitId::new(id)).unwrap().stat(StatKey::IceDmgBoost)
    }

    #[test]
    fn same_element_allies_are_boosted() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = start(setup(), &mut ctx);

        assert_eq!(ice_boost(&state, "w"), 0.12);
        assert_eq!(ice_boost(&state, "ice"), 0.12);
        assert_eq!(ice_boost(&state, "fire"), 0.0);
        assert_eq!(state.auras.len(), 1);
    }

    #[test]
    fn boost_ends_when_the_wearer_falls() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = start(setup(), &mut ctx);

        let (state, entry) = engine::apply_unified_damage(
            state,
            &mut ctx,
            &UnitId::new("e1"),
            &wearer(),
            1.0e6,
            DamageOptions::new(DamageKind::Direct, "hit"),
        );

        assert!(entry.killed);
        assert!(state.auras.is_empty());
        assert_eq!(ice_boost(&state, "ice"), 0.0);
    }
}
