//! Light cones: base stats, passive stat lines and conditional passives.
//!
//! Equipping a light cone adds its base HP/ATK/DEF to the wearer's base stats
//! and its unconditional passives to the equipment layer. Conditional
//! passives run as a [`CombatHandler`] registered after the wearer's kit
//! handler. Every value is indexed by superimposition (1 to 5).

pub mod day_one_of_my_new_life;
pub mod planetary_rendezvous;
pub mod sleep_like_the_dead;
pub mod under_the_blue_sky;

use std::collections::BTreeMap;
use std::sync::Arc;

use combat_core::{CombatHandler, Modifier, ModifierOp, StatKey, Unit, UnitId};

pub const MAX_SUPERIMPOSITION: u8 = 5;

/// Builds the conditional-passive handler for `wearer`.
pub type LightConeHandler = fn(wearer: &UnitId, superimposition: u8) -> Arc<dyn CombatHandler>;

/// An unconditional passive stat line.
#[derive(Clone, Copy, Debug)]
pub struct PassiveStat {
    pub stat: StatKey,
    pub op: ModifierOp,
    pub values: [f64; 5],
}

#[derive(Clone, Copy)]
pub struct LightCone {
    pub id: &'static str,
    pub name: &'static str,
    pub hp: f64,
    pub atk: f64,
    pub def: f64,
    pub passives: &'static [PassiveStat],
    pub handler: Option<LightConeHandler>,
}

impl LightCone {
    /// `unit` wearing this light cone at `superimposition` (clamped to 1..=5).
    /// The caller still calls [`Unit::ready`].
    pub fn equip(&self, unit: Unit, superimposition: u8) -> Unit {
        let base = |unit: &Unit, stat: StatKey| unit.base_stats.get(stat);
        let hp = base(&unit, StatKey::Hp) + self.hp;
        let atk = base(&unit, StatKey::Atk) + self.atk;
        let def = base(&unit, StatKey::Def) + self.def;

        let mut unit = unit
            .with_base_stat(StatKey::Hp, hp)
            .with_base_stat(StatKey::Atk, atk)
            .with_base_stat(StatKey::Def, def);
        unit.equipment.extend(self.passive_modifiers(superimposition));
        unit
    }

    pub fn passive_modifiers(&self, superimposition: u8) -> Vec<Modifier> {
        self.passives
            .iter()
            .map(|passive| Modifier {
                op: passive.op,
                ..Modifier::add(passive.stat, rank(superimposition, passive.values))
            }
            .with_source(self.name))
            .collect()
    }

    pub fn handler(&self, wearer: &UnitId, superimposition: u8) -> Option<Arc<dyn CombatHandler>> {
        self.handler
            .map(|factory| factory(wearer, superimposition.clamp(1, MAX_SUPERIMPOSITION)))
    }
}

/// Light cones addressable by id.
#[derive(Clone, Default)]
pub struct LightConeCatalog {
    cones: BTreeMap<&'static str, LightCone>,
}

impl LightConeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every bundled light cone.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.register(under_the_blue_sky::LIGHT_CONE);
        catalog.register(planetary_rendezvous::LIGHT_CONE);
        catalog.register(day_one_of_my_new_life::LIGHT_CONE);
        catalog.register(sleep_like_the_dead::LIGHT_CONE);
        catalog
    }

    /// Adds `cone`, replacing any light cone with the same id.
    pub fn register(&mut self, cone: LightCone) {
        self.cones.insert(cone.id, cone);
    }

    pub fn get(&self, id: &str) -> Option<&LightCone> {
        self.cones.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cones.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }
}

/// Entry of a superimposition table.
pub(crate) fn rank(superimposition: u8, values: [f64; 5]) -> f64 {
    values[usize::from(superimposition.clamp(1, MAX_SUPERIMPOSITION) - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::Element;

    #[test]
    fn standard_catalog_lists_every_light_cone() {
        let catalog = LightConeCatalog::standard();
        assert_eq!(
            catalog.ids().collect::<Vec<_>>(),
            vec![
                "day_one_of_my_new_life",
                "planetary_rendezvous",
                "sleep_like_the_dead",
                "under_the_blue_sky",
            ]
        );
    }

    #[test]
    fn rank_is_clamped() {
        let table = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(rank(0, table), 1.0);
        assert_eq!(rank(3, table), 3.0);
        assert_eq!(rank(9, table), 5.0);
    }

    #[test]
    fn equip_adds_base_stats_and_passives() {
        let cone = under_the_blue_sky::LIGHT_CONE;
        let unit = Unit::character(UnitId::new("w"), "Wearer", Element::Ice)
            .with_base_stat(StatKey::Hp, 1000.0)
            .with_base_stat(StatKey::Atk, 500.0);

        let unit = cone.equip(unit, 5).ready();
        assert_eq!(unit.base_stats.get(StatKey::Hp), 1000.0 + cone.hp);
        assert_eq!(unit.equipment.len(), 1);
        // (500 + 476) × 1.32
        assert!((unit.stat(StatKey::Atk) - 976.0 * 1.32).abs() < 1e-9);
    }
}
