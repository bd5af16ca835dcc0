//! Scenario → initial [`GameState`].
//!
//! Party members are built from their kits in slot order and their handlers
//! registered in the same order, each kit handler followed by its light cone
//! handler; enemies follow, built from their inline specs. Every reference is
//! resolved here so the engine never sees an unknown id.

use combat_content::{EnemySpec, KitCatalog, LightConeCatalog, PartyMemberSpec, Scenario};
use combat_core::{
    Ability, AbilitySet, Element, ElementSet, GameState, StatKey, TargetType, Unit, UnitRegistry,
};
use tracing::{debug, info};

use crate::error::{Result, RuntimeError};

/// Damage multiplier of an assembled enemy's basic attack.
const ENEMY_ATTACK_MULTIPLIER: f64 = 1.0;
/// Energy an enemy gains per attack; enemies never use ultimates.
const ENEMY_ATTACK_ENERGY: f64 = 0.0;

/// Builds the battle described by `scenario`.
pub fn assemble(scenario: &Scenario, kits: &KitCatalog, light_cones: &LightConeCatalog) -> Result<GameState> {
    if scenario.party.is_empty() {
        return Err(RuntimeError::EmptyParty);
    }
    if scenario.enemies.is_empty() {
        return Err(RuntimeError::NoEnemies);
    }

    let mut allies = Vec::with_capacity(scenario.party.len());
    let mut handlers = Vec::with_capacity(scenario.party.len());
    for member in &scenario.party {
        let kit = kits
            .get(&member.kit)
            .ok_or_else(|| RuntimeError::UnknownKit(member.kit.clone()))?;
        let id = member.unit_id();
        debug!(target: "combat::assembly", kit = kit.id, unit = %id, eidolon = member.eidolon, "party member");

        let mut unit = kit.unit(id.clone(), member.level, member.eidolon);
        handlers.push((kit.handler)(&id, member.level, member.eidolon));

        if let Some(spec) = &member.light_cone {
            let cone = light_cones
                .get(&spec.id)
                .ok_or_else(|| RuntimeError::UnknownLightCone(spec.id.clone()))?;
            debug!(target: "combat::assembly", unit = %id, light_cone = cone.id, superimposition = spec.superimposition, "light cone");
            unit = cone.equip(unit, spec.superimposition);
            handlers.extend(cone.handler(&id, spec.superimposition));
        }
        allies.push(party_unit(member, unit)?);
    }

    let extra = scenario.options.extra_weaknesses.iter().copied().collect::<ElementSet>();
    let enemies = scenario.enemies.iter().map(|spec| enemy_unit(spec, extra));

    let registry = UnitRegistry::from_units(allies.into_iter().chain(enemies))?;
    info!(
        target: "combat::assembly",
        party = scenario.party.len(),
        enemies = scenario.enemies.len(),
        rounds = scenario.options.rounds,
        "assembled battle"
    );

    let state = GameState::new(registry, scenario.options.combat_config());
    Ok(handlers.into_iter().fold(state, GameState::with_handler))
}

fn party_unit(member: &PartyMemberSpec, unit: Unit) -> Result<Unit> {
    let rotation = member
        .rotation_config()
        .map_err(|source| RuntimeError::Rotation {
            unit: member.unit_id().to_string(),
            source,
        })?;
    let mut unit = unit;
    unit.equipment.extend(member.equipment.iter().cloned());
    let unit = match rotation {
        Some(rotation) => unit.with_rotation(rotation),
        None => unit,
    };
    Ok(unit.ready())
}

/// Enemy with a single-target ATK basic attack.
pub fn enemy_unit(spec: &EnemySpec, extra_weaknesses: ElementSet) -> Unit {
    let weaknesses = spec.weaknesses.iter().copied().collect::<ElementSet>() | extra_weaknesses;
    let element = spec.element.unwrap_or(Element::Physical);
    let abilities = AbilitySet {
        basic: Some(
            Ability::new(format!("{}-attack", spec.id), "Attack", TargetType::SingleEnemy)
                .with_hit(StatKey::Atk, ENEMY_ATTACK_MULTIPLIER, 0.0)
                .with_energy(ENEMY_ATTACK_ENERGY),
        ),
        ..AbilitySet::default()
    };

    let unit = Unit::enemy(spec.unit_id(), spec.display_name(), spec.level)
        .with_element(element)
        .with_base_stat(StatKey::Hp, spec.hp)
        .with_base_stat(StatKey::Atk, spec.atk)
        .with_base_stat(StatKey::Def, spec.defense())
        .with_base_stat(StatKey::Spd, spec.spd)
        .with_toughness(spec.toughness)
        .with_weaknesses(weaknesses)
        .with_abilities(abilities);

    spec.resistances
        .iter()
        .fold(unit, |unit, (element, res)| unit.with_base_stat(element.res_stat(), *res))
        .ready()
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_content::{LightConeSpec, ScenarioLoader, ScenarioOptions};
    use combat_core::{CombatError, UnitId};

    fn scenario() -> Scenario {
        ScenarioLoader::from_toml(
            r#"
            [options]
            extra_weaknesses = ["quantum"]

            [[party]]
            kit = "yanqing"
            rotation = "s,b"
            equipment = [{ stat = "spd", value = 25.0 }]

            [[party]]
            kit = "march_7th"
            id = "march"

            [[enemies]]
            id = "e1"
            hp = 100000
            spd = 100
            toughness = 90
            weaknesses = ["ice"]
            resistances = { physical = 0.4 }
            "#,
        )
        .unwrap()
    }

    #[test]
    fn builds_party_and_enemies_in_order() {
        let state = assemble(&scenario(), &KitCatalog::standard(), &LightConeCatalog::standard()).unwrap();

        let ids: Vec<_> = state.registry.iter().map(|unit| unit.id.clone()).collect();
        assert_eq!(ids, vec![UnitId::new("yanqing"), UnitId::new("march"), UnitId::new("e1")]);
        assert_eq!(state.handlers.len(), 2);

        let yanqing = state.unit(&UnitId::new("yanqing")).unwrap();
        assert_eq!(yanqing.stat(StatKey::Spd), 134.0);
        assert_eq!(yanqing.rotation.as_ref().unwrap().sequence.len(), 2);

        let enemy = state.unit(&UnitId::new("e1")).unwrap();
        assert!(enemy.weaknesses.has(Element::Ice));
        assert!(enemy.weaknesses.has(Element::Quantum));
        assert_eq!(enemy.stat(StatKey::PhysicalRes), 0.4);
        assert_eq!(enemy.stat(StatKey::Def), 1000.0);
        assert_eq!(enemy.toughness, 90.0);
    }

    #[test]
    fn light_cone_adds_stats_and_registers_its_handler() {
        let plain = assemble(&scenario(), &KitCatalog::standard(), &LightConeCatalog::standard()).unwrap();
        let mut scenario = scenario();
        scenario.party[0].light_cone = Some(LightConeSpec {
            id: "under_the_blue_sky".into(),
            superimposition: 1,
        });
        let state = assemble(&scenario, &KitCatalog::standard(), &LightConeCatalog::standard()).unwrap();

        assert_eq!(state.handlers.len(), 3);
        let before = plain.unit(&UnitId::new("yanqing")).unwrap();
        let after = state.unit(&UnitId::new("yanqing")).unwrap();
        assert_eq!(after.base_stats.get(StatKey::Atk), before.base_stats.get(StatKey::Atk) + 476.0);
        assert_eq!(after.equipment.len(), before.equipment.len() + 1);
        assert!(after.stat(StatKey::Atk) > before.stat(StatKey::Atk));
    }

    #[test]
    fn unknown_light_cone_is_rejected() {
        let mut scenario = scenario();
        scenario.party[1].light_cone = Some(LightConeSpec {
            id: "cornucopia".into(),
            superimposition: 1,
        });
        let err = assemble(&scenario, &KitCatalog::standard(), &LightConeCatalog::standard()).unwrap_err();
        assert!(matches!(&err, RuntimeError::UnknownLightCone(id) if id == "cornucopia"));
        assert_eq!(err.error_code(), "RUNTIME_UNKNOWN_LIGHT_CONE");
    }

    #[test]
    fn unknown_kit_is_rejected() {
        let mut scenario = scenario();
        scenario.party[0].kit = "kafka".into();
        let err = assemble(&scenario, &KitCatalog::standard(), &LightConeCatalog::standard()).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownKit(kit) if kit == "kafka"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut scenario = scenario();
        scenario.party[1].id = Some("yanqing".into());
        let err = assemble(&scenario, &KitCatalog::standard(), &LightConeCatalog::standard()).unwrap_err();
        assert_eq!(err.error_code(), "REGISTRY_DUPLICATE_UNIT");
    }

    #[test]
    fn empty_sides_are_rejected() {
        let empty = Scenario {
            options: ScenarioOptions::default(),
            party: Vec::new(),
            enemies: Vec::new(),
        };
        assert!(matches!(
            assemble(&empty, &KitCatalog::standard(), &LightConeCatalog::standard()),
            Err(RuntimeError::EmptyParty)
        ));
    }

    #[test]
    fn bad_rotation_names_the_unit() {
        let mut scenario = scenario();
        scenario.party[0].rotation = Some("s,q".into());
        let err = assemble(&scenario, &KitCatalog::standard(), &LightConeCatalog::standard()).unwrap_err();
        assert_eq!(err.to_string(), "invalid rotation for `yanqing`");
    }
}
