//! Battle fixtures shared by the kit tests.

use std::sync::Arc;

use combat_core::{
    Ability, AbilitySet, CombatConfig, CombatHandler, ElementSet, GameState, StatKey, TargetType,
    Unit, UnitId, UnitRegistry,
};

/// Sturdy level 80 enemy with a plain ATK basic attack.
pub(crate) fn dummy(id: &str, weaknesses: ElementSet) -> Unit {
    Unit::enemy(UnitId::new(id), format!("Dummy {id}"), 80)
        .with_base_stat(StatKey::Hp, 200_000.0)
        .with_base_stat(StatKey::Atk, 500.0)
        .with_base_stat(StatKey::Def, 1000.0)
        .with_base_stat(StatKey::Spd, 100.0)
        .with_toughness(90.0)
        .with_weaknesses(weaknesses)
        .with_abilities(AbilitySet {
            basic: Some(
                Ability::new("dummy-basic", "Strike", TargetType::SingleEnemy)
                    .with_hit(StatKey::Atk, 1.0, 0.0),
            ),
            ..AbilitySet::default()
        })
        .ready()
}

/// Battle with `allies` and `enemies`, `handlers` registered in order.
pub(crate) fn party_battle(
    allies: Vec<Unit>,
    handlers: Vec<Arc<dyn CombatHandler>>,
    enemies: Vec<Unit>,
) -> GameState {
    let registry = UnitRegistry::from_units(allies.into_iter().chain(enemies))
        .expect("fixture ids are unique");
    handlers
        .into_iter()
        .fold(GameState::new(registry, CombatConfig::default()), GameState::with_handler)
}

pub(crate) fn battle(ally: Unit, handler: Arc<dyn CombatHandler>, enemies: Vec<Unit>) -> GameState {
    party_battle(vec![ally], vec![handler], enemies)
}
