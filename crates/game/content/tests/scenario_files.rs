//! Scenario files on disk, in both formats.

use std::io::Write;

use combat_content::{KitCatalog, ScenarioLoader};
use combat_core::{Element, UnitId};
use tempfile::Builder;

fn write(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_toml_by_extension() {
    let file = write(
        ".toml",
        r#"
        [options]
        rounds = 2

        [[party]]
        kit = "boothill"

        [[enemies]]
        id = "e1"
        hp = 10000
        spd = 100
        toughness = 60
        weaknesses = ["physical"]
        "#,
    );

    let scenario = ScenarioLoader::load(file.path()).unwrap();
    assert_eq!(scenario.options.rounds, 2);
    assert_eq!(scenario.party[0].unit_id(), UnitId::new("boothill"));
    assert_eq!(scenario.enemies[0].weaknesses, vec![Element::Physical]);
}

#[test]
fn loads_ron_by_extension() {
    let file = write(
        ".ron",
        r#"(
            options: (rounds: 4, seed: 9),
            party: [(kit: "march_7th", id: Some("march"))],
            enemies: [(id: "e1", hp: 5000.0, spd: 110.0, toughness: 30.0)],
        )"#,
    );

    let scenario = ScenarioLoader::load(file.path()).unwrap();
    assert_eq!(scenario.options.seed, 9);
    assert_eq!(scenario.party[0].unit_id(), UnitId::new("march"));
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = ScenarioLoader::load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn every_scenario_kit_resolves() {
    let file = write(
        ".toml",
        r#"
        [[party]]
        kit = "yanqing"
        [[party]]
        kit = "march_7th"
        [[party]]
        kit = "boothill"

        [[enemies]]
        id = "e1"
        hp = 10000
        spd = 100
        toughness = 60
        "#,
    );
    let scenario = ScenarioLoader::load(file.path()).unwrap();
    let catalog = KitCatalog::standard();

    for member in &scenario.party {
        let kit = catalog.get(&member.kit).unwrap();
        let unit = kit.unit(member.unit_id(), member.level, member.eidolon).ready();
        assert!(unit.is_ally());
        assert!(unit.max_hp() > 0.0);
        assert!(unit.abilities.basic.is_some());
    }
}
