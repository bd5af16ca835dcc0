//! Unit records: characters and enemies.

use crate::action::{AbilitySet, RotationConfig};
use crate::effect::{Capability, Effect};
use crate::element::{Element, ElementSet};
use crate::state::{EffectId, UnitId};
use crate::stats::{self, Modifier, StatBlock, StatKey, Trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Faction {
    Ally,
    Enemy,
}

/// A combatant.
///
/// `stats` is derived: it is rebuilt by [`stats::recalculate`] from
/// `base_stats`, `equipment`, `traces`, `effects` and `auras` whenever effects
/// or auras change.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub element: Element,
    pub level: u32,
    pub faction: Faction,
    pub eidolon: u8,

    pub base_stats: StatBlock,
    pub equipment: Vec<Modifier>,
    pub traces: Vec<Trace>,
    pub stats: StatBlock,

    pub hp: f64,
    pub ep: f64,
    pub shield: f64,
    pub toughness: f64,
    pub max_toughness: f64,
    pub weaknesses: ElementSet,
    pub effects: Vec<Effect>,
    /// Modifiers received from field auras, maintained by [`crate::effect::refresh_auras`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub auras: Vec<Modifier>,

    pub abilities: AbilitySet,
    pub rotation: Option<RotationConfig>,
    pub rotation_index: usize,
    pub action_value: f64,
}

impl Unit {
    pub const DEFAULT_LEVEL: u32 = 80;

    fn new(id: UnitId, name: String, element: Element, faction: Faction) -> Self {
        Self {
            id,
            name,
            element,
            level: Self::DEFAULT_LEVEL,
            faction,
            eidolon: 0,
            base_stats: StatBlock::new(),
            equipment: Vec::new(),
            traces: Vec::new(),
            stats: StatBlock::new(),
            hp: 0.0,
            ep: 0.0,
            shield: 0.0,
            toughness: 0.0,
            max_toughness: 0.0,
            weaknesses: ElementSet::empty(),
            effects: Vec::new(),
            auras: Vec::new(),
            abilities: AbilitySet::default(),
            rotation: None,
            rotation_index: 0,
            action_value: 0.0,
        }
    }

    pub fn character(id: UnitId, name: impl Into<String>, element: Element) -> Self {
        Self::new(id, name.into(), element, Faction::Ally).with_rotation(RotationConfig::default())
    }

    pub fn enemy(id: UnitId, name: impl Into<String>, level: u32) -> Self {
        Self::new(id, name.into(), Element::Physical, Faction::Enemy).with_level(level)
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    #[must_use]
    pub fn with_eidolon(mut self, eidolon: u8) -> Self {
        self.eidolon = eidolon;
        self
    }

    #[must_use]
    pub fn with_base_stats(mut self, base_stats: StatBlock) -> Self {
        self.base_stats = base_stats;
        self
    }

    #[must_use]
    pub fn with_base_stat(mut self, stat: StatKey, value: f64) -> Self {
        self.base_stats.set(stat, value);
        self
    }

    #[must_use]
    pub fn with_equipment(mut self, equipment: Vec<Modifier>) -> Self {
        self.equipment = equipment;
        self
    }

    #[must_use]
    pub fn with_traces(mut self, traces: Vec<Trace>) -> Self {
        self.traces = traces;
        self
    }

    #[must_use]
    pub fn with_toughness(mut self, max_toughness: f64) -> Self {
        self.max_toughness = max_toughness.max(0.0);
        self.toughness = self.max_toughness;
        self
    }

    #[must_use]
    pub fn with_weaknesses(mut self, weaknesses: ElementSet) -> Self {
        self.weaknesses = weaknesses;
        self
    }

    #[must_use]
    pub fn with_abilities(mut self, abilities: AbilitySet) -> Self {
        self.abilities = abilities;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: RotationConfig) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Derives stats and fills HP and toughness to their maximums.
    #[must_use]
    pub fn ready(self) -> Self {
        let mut unit = stats::recalculate(self);
        unit.hp = unit.max_hp();
        unit.toughness = unit.max_toughness;
        unit
    }

    pub fn is_enemy(&self) -> bool {
        self.faction == Faction::Enemy
    }

    pub fn is_ally(&self) -> bool {
        self.faction == Faction::Ally
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn is_opponent_of(&self, other: &Unit) -> bool {
        self.faction != other.faction
    }

    pub fn max_hp(&self) -> f64 {
        self.stats.get(StatKey::Hp)
    }

    pub fn max_ep(&self) -> f64 {
        self.stats.get(StatKey::MaxEp)
    }

    pub fn spd(&self) -> f64 {
        self.stats.get(StatKey::Spd)
    }

    pub fn stat(&self, key: StatKey) -> f64 {
        self.stats.get(key)
    }

    /// Current HP as a fraction of max HP; `0.0` when max HP is zero.
    pub fn hp_ratio(&self) -> f64 {
        let max = self.max_hp();
        if max > 0.0 { self.hp / max } else { 0.0 }
    }

    pub fn is_broken(&self) -> bool {
        self.max_toughness > 0.0 && self.toughness <= 0.0
    }

    pub fn has_ultimate_ready(&self) -> bool {
        let max = self.max_ep();
        max > 0.0 && self.ep >= max
    }

    pub fn has_trace(&self, id: &str) -> bool {
        self.traces.iter().any(|trace| trace.id == id)
    }

    pub fn effect(&self, id: &EffectId) -> Option<&Effect> {
        self.effects.iter().find(|effect| &effect.id == id)
    }

    pub fn has_effect(&self, id: &EffectId) -> bool {
        self.effect(id).is_some()
    }

    /// True when any active effect carries every flag in `capability`.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.effects.iter().any(|effect| effect.tags.contains(capability))
    }

    /// Source of the first active taunt, if any.
    pub fn taunted_by(&self) -> Option<&UnitId> {
        self.effects
            .iter()
            .find(|effect| effect.tags.contains(Capability::TAUNT))
            .map(|effect| &effect.source)
    }

    /// Crowd-control status that prevents this unit from acting.
    pub fn crowd_control(&self) -> Option<Capability> {
        [
            Capability::FREEZE,
            Capability::ENTANGLEMENT,
            Capability::IMPRISONMENT,
        ]
        .into_iter()
        .find(|status| self.has_capability(*status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_fills_hp_and_toughness() {
        let enemy = Unit::enemy(UnitId::new("e1"), "Dummy", 80)
            .with_base_stat(StatKey::Hp, 10_000.0)
            .with_toughness(90.0)
            .ready();

        assert_eq!(enemy.hp, 10_000.0);
        assert_eq!(enemy.toughness, 90.0);
        assert!(!enemy.is_broken());
        assert_eq!(enemy.hp_ratio(), 1.0);
    }

    #[test]
    fn units_without_toughness_never_break() {
        let ally = Unit::character(UnitId::new("a"), "Ally", Element::Fire).ready();
        assert!(!ally.is_broken());
        assert!(!ally.has_ultimate_ready());
    }
}
