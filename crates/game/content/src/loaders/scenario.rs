//! Battle scenario loader.
//!
//! A scenario names the party by kit id, describes each enemy inline and
//! carries the battle options. TOML and RON share the same schema:
//!
//! ```toml
//! [options]
//! rounds = 5
//! seed = 7
//!
//! [[party]]
//! kit = "yanqing"
//! eidolon = 1
//! rotation = "s,b,b"
//! light_cone = { id = "under_the_blue_sky", superimposition = 5 }
//!
//! [[enemies]]
//! id = "target"
//! hp = 400000
//! spd = 100
//! toughness = 120
//! weaknesses = ["ice"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::{
    CombatConfig, Element, Modifier, RotationConfig, RotationError, UltimatePolicy, UnitId,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

const DEFAULT_LEVEL: u32 = 80;

fn default_level() -> u32 {
    DEFAULT_LEVEL
}

fn default_superimposition() -> u8 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub options: ScenarioOptions,
    pub party: Vec<PartyMemberSpec>,
    pub enemies: Vec<EnemySpec>,
}

/// Battle-wide settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOptions {
    pub rounds: u32,
    pub seed: u64,
    /// Weaknesses added to every enemy on top of its own.
    pub extra_weaknesses: Vec<Element>,
    pub initial_skill_points: u32,
    pub max_skill_points: u32,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            rounds: CombatConfig::DEFAULT_ROUNDS,
            seed: 0,
            extra_weaknesses: Vec::new(),
            initial_skill_points: CombatConfig::DEFAULT_INITIAL_SKILL_POINTS,
            max_skill_points: CombatConfig::DEFAULT_MAX_SKILL_POINTS,
        }
    }
}

impl ScenarioOptions {
    pub fn combat_config(&self) -> CombatConfig {
        CombatConfig::new()
            .with_rounds(self.rounds)
            .with_skill_points(self.initial_skill_points, self.max_skill_points)
    }
}

/// One party slot: a kit plus its build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartyMemberSpec {
    pub kit: String,
    /// Unit id; defaults to the kit id.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub eidolon: u8,
    /// Relic and planar stat lines.
    #[serde(default)]
    pub equipment: Vec<Modifier>,
    #[serde(default)]
    pub light_cone: Option<LightConeSpec>,
    /// Rotation sequence such as `"s,b,b"`.
    #[serde(default)]
    pub rotation: Option<String>,
    #[serde(default)]
    pub ultimate: Option<UltimatePolicy>,
    /// Ally receiving supportive skills.
    #[serde(default)]
    pub skill_target: Option<String>,
}

impl PartyMemberSpec {
    pub fn unit_id(&self) -> UnitId {
        UnitId::new(self.id.clone().unwrap_or_else(|| self.kit.clone()))
    }

    /// Rotation described by this slot; `None` keeps the kit default.
    pub fn rotation_config(&self) -> Result<Option<RotationConfig>, RotationError> {
        if self.rotation.is_none() && self.ultimate.is_none() && self.skill_target.is_none() {
            return Ok(None);
        }
        let mut rotation = match &self.rotation {
            Some(sequence) => RotationConfig::parse(sequence)?,
            None => RotationConfig::default(),
        };
        if let Some(policy) = self.ultimate {
            rotation = rotation.with_ultimate(policy);
        }
        if let Some(target) = &self.skill_target {
            rotation = rotation.with_skill_target(UnitId::new(target.clone()));
        }
        Ok(Some(rotation))
    }
}

/// Equipped light cone, by catalog id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightConeSpec {
    pub id: String,
    #[serde(default = "default_superimposition")]
    pub superimposition: u8,
}

/// An enemy described inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    pub hp: f64,
    #[serde(default)]
    pub atk: f64,
    /// Defaults to the level curve `200 + 10 × level`.
    #[serde(default)]
    pub def: Option<f64>,
    pub spd: f64,
    pub toughness: f64,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub weaknesses: Vec<Element>,
    #[serde(default)]
    pub resistances: BTreeMap<Element, f64>,
}

impl EnemySpec {
    pub fn unit_id(&self) -> UnitId {
        UnitId::new(self.id.clone())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn defense(&self) -> f64 {
        self.def.unwrap_or(200.0 + 10.0 * f64::from(self.level))
    }
}

/// Loader for battle scenarios from TOML or RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario, picking the format from the file extension
    /// (`.ron` for RON, anything else for TOML).
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let is_ron = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));

        let scenario = if is_ron {
            Self::from_ron(&content)?
        } else {
            Self::from_toml(&content)?
        };
        tracing::debug!(
            target: "combat::content",
            path = %path.display(),
            party = scenario.party.len(),
            enemies = scenario.enemies.len(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    pub fn from_toml(content: &str) -> LoadResult<Scenario> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario TOML: {}", e))
    }

    pub fn from_ron(content: &str) -> LoadResult<Scenario> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::StatKey;

    const TOML: &str = r#"
        [options]
        rounds = 3
        seed = 42
        extra_weaknesses = ["physical"]

        [[party]]
        kit = "march_7th"
        id = "march"
        eidolon = 2
        rotation = "s,b"
        ultimate = "on_turn"
        skill_target = "yanqing"
        equipment = [{ stat = "def", value = 0.54, op = "multiply" }]
        light_cone = { id = "day_one_of_my_new_life" }

        [[party]]
        kit = "yanqing"
        light_cone = { id = "under_the_blue_sky", superimposition = 5 }

        [[enemies]]
        id = "boss"
        hp = 500000
        spd = 120
        toughness = 160
        weaknesses = ["ice"]
        resistances = { ice = 0.2 }
    "#;

    #[test]
    fn parses_toml_with_defaults() {
        let scenario = ScenarioLoader::from_toml(TOML).unwrap();

        assert_eq!(scenario.options.rounds, 3);
        assert_eq!(scenario.options.extra_weaknesses, vec![Element::Physical]);
        assert_eq!(scenario.options.max_skill_points, CombatConfig::DEFAULT_MAX_SKILL_POINTS);

        let march = &scenario.party[0];
        assert_eq!(march.unit_id(), UnitId::new("march"));
        assert_eq!(march.equipment, vec![Modifier::multiply(StatKey::Def, 0.54)]);
        let rotation = march.rotation_config().unwrap().unwrap();
        assert_eq!(rotation.ultimate, UltimatePolicy::OnTurn);
        assert_eq!(rotation.skill_target, Some(UnitId::new("yanqing")));
        assert_eq!(
            march.light_cone,
            Some(LightConeSpec {
                id: "day_one_of_my_new_life".into(),
                superimposition: 1,
            })
        );

        let yanqing = &scenario.party[1];
        assert_eq!(yanqing.unit_id(), UnitId::new("yanqing"));
        assert_eq!(yanqing.level, 80);
        assert_eq!(yanqing.rotation_config().unwrap(), None);
        assert_eq!(yanqing.light_cone.as_ref().map(|cone| cone.superimposition), Some(5));

        let boss = &scenario.enemies[0];
        assert_eq!(boss.defense(), 1000.0);
        assert_eq!(boss.display_name(), "boss");
        assert_eq!(boss.resistances.get(&Element::Ice), Some(&0.2));
    }

    #[test]
    fn parses_ron() {
        let ron = r#"(
            party: [(kit: "boothill", eidolon: 1)],
            enemies: [(id: "e1", hp: 1000.0, spd: 90.0, toughness: 30.0, def: Some(500.0))],
        )"#;
        let scenario = ScenarioLoader::from_ron(ron).unwrap();
        assert_eq!(scenario.options, ScenarioOptions::default());
        assert_eq!(scenario.party[0].eidolon, 1);
        assert_eq!(scenario.enemies[0].defense(), 500.0);
    }

    #[test]
    fn bad_rotation_is_reported() {
        let member = PartyMemberSpec {
            kit: "yanqing".into(),
            id: None,
            level: 80,
            eidolon: 0,
            equipment: Vec::new(),
            light_cone: None,
            rotation: Some("s,x".into()),
            ultimate: None,
            skill_target: None,
        };
        assert!(member.rotation_config().is_err());
    }

    #[test]
    fn rejects_missing_enemies() {
        let err = ScenarioLoader::from_toml("[[party]]\nkit = \"yanqing\"\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse scenario TOML"));
    }
}
