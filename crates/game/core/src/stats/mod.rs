//! Stat system.
//!
//! # Architecture
//!
//! ```text
//! [ Base stats ]            character/enemy static data
//!      ↓
//! [ Equipment ]             light cone + relic stat lines
//!      ↓
//! [ Traces ]                always-active skill tree bonuses
//!      ↓
//! [ Effect modifiers ]      active buffs/debuffs (value × stacks)
//!      ↓
//! [ Effective stats ]       `Unit::stats`
//! ```
//!
//! Every layer contributes [`Modifier`]s to a per-stat [`BonusStack`]; the
//! stack resolves `base × (1 + Σincreased) + Σflat`. The builder is a pure
//! function of the unit's static data and active effects, so recalculating is
//! idempotent.

pub mod bonus;
pub mod builder;
pub mod modifier;

use std::collections::BTreeMap;

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

pub use bonus::{Bonus, BonusStack};
pub use builder::{compute_stats, recalculate};
pub use modifier::{Modifier, ModifierOp, StackScaling, Trace};

/// Every stat the engine understands.
///
/// Percentages are stored as fractions (`0.2` = 20%).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatKey {
    // ===== primary =====
    Hp,
    Atk,
    Def,
    Spd,
    Aggro,

    // ===== offense =====
    CritRate,
    CritDmg,
    BreakEffect,
    BreakEfficiencyBoost,
    SuperBreakDmgBoost,
    AllTypeDmgBoost,
    BasicAtkDmgBoost,
    SkillDmgBoost,
    UltDmgBoost,
    FuaDmgBoost,
    DotDmgBoost,
    DefIgnore,
    AllTypeResPen,

    // ===== utility =====
    EnergyRegenRate,
    MaxEp,
    EffectHitRate,
    EffectRes,
    DebuffRes,
    OutgoingHealingBoost,
    IncomingHealBoost,
    ShieldStrengthBoost,

    // ===== received (debuff side) =====
    AllDmgDealtReduction,
    DefReduction,
    AllTypeVuln,

    // ===== elemental damage =====
    PhysicalDmgBoost,
    FireDmgBoost,
    IceDmgBoost,
    LightningDmgBoost,
    WindDmgBoost,
    QuantumDmgBoost,
    ImaginaryDmgBoost,

    // ===== elemental resistance =====
    PhysicalRes,
    FireRes,
    IceRes,
    LightningRes,
    WindRes,
    QuantumRes,
    ImaginaryRes,

    // ===== elemental penetration =====
    PhysicalResPen,
    FireResPen,
    IceResPen,
    LightningResPen,
    WindResPen,
    QuantumResPen,
    ImaginaryResPen,

    // ===== elemental vulnerability =====
    PhysicalVuln,
    FireVuln,
    IceVuln,
    LightningVuln,
    WindVuln,
    QuantumVuln,
    ImaginaryVuln,
}

/// Sparse stat snapshot. Missing stats read as `0.0`.
///
/// Zero values are never stored, so two blocks compare equal whenever every
/// stat reads the same.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatBlock(BTreeMap<StatKey, f64>);

impl StatBlock {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: StatKey) -> f64 {
        self.0.get(&key).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, key: StatKey, value: f64) {
        if value == 0.0 {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    pub fn add(&mut self, key: StatKey, delta: f64) {
        self.set(key, self.get(key) + delta);
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, key: StatKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        self.0.iter().map(|(key, value)| (*key, *value))
    }

    pub fn keys(&self) -> impl Iterator<Item = StatKey> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(StatKey, f64)> for StatBlock {
    fn from_iter<I: IntoIterator<Item = (StatKey, f64)>>(iter: I) -> Self {
        let mut block = StatBlock::new();
        for (key, value) in iter {
            block.add(key, value);
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_are_not_stored() {
        let block = StatBlock::new()
            .with(StatKey::Atk, 620.0)
            .with(StatKey::CritRate, 0.0);

        assert_eq!(block.get(StatKey::CritRate), 0.0);
        assert_eq!(block, StatBlock::new().with(StatKey::Atk, 620.0));
    }

    #[test]
    fn collecting_sums_duplicate_keys() {
        let block: StatBlock = [(StatKey::Spd, 100.0), (StatKey::Spd, 6.0)]
            .into_iter()
            .collect();

        assert_eq!(block.get(StatKey::Spd), 106.0);
    }

    #[test]
    fn stat_names_match_data_files() {
        assert_eq!(StatKey::BreakEfficiencyBoost.to_string(), "break_efficiency_boost");
        assert_eq!("ice_res_pen".parse::<StatKey>(), Ok(StatKey::IceResPen));
    }
}
