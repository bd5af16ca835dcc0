//! Aggregate battle totals and the replay log.

use std::collections::BTreeMap;

use strum::{Display, IntoStaticStr};

use crate::action::ActionKind;
use crate::event::DamageKind;
use crate::state::UnitId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Timeout,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterTotals {
    pub damage_dealt: f64,
    pub healing_dealt: f64,
    pub shield_provided: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleResult {
    pub total_damage_dealt: f64,
    pub character_stats: BTreeMap<UnitId, CharacterTotals>,
    pub outcome: Option<BattleOutcome>,
}

impl BattleResult {
    pub fn record_damage(&mut self, source: &UnitId, amount: f64) {
        self.total_damage_dealt += amount;
        self.totals_mut(source).damage_dealt += amount;
    }

    pub fn record_healing(&mut self, source: &UnitId, amount: f64) {
        self.totals_mut(source).healing_dealt += amount;
    }

    pub fn record_shield(&mut self, source: &UnitId, amount: f64) {
        self.totals_mut(source).shield_provided += amount;
    }

    pub fn totals(&self, source: &UnitId) -> Option<&CharacterTotals> {
        self.character_stats.get(source)
    }

    fn totals_mut(&mut self, source: &UnitId) -> &mut CharacterTotals {
        self.character_stats.entry(source.clone()).or_default()
    }
}

/// What a log entry describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogKind {
    Action(ActionKind),
    Damage(DamageKind),
    TurnSkipped,
    BattleStart,
    BattleEnd,
}

/// A single line of the action breakdown.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogDetail {
    Damage {
        target: UnitId,
        kind: DamageKind,
        amount: f64,
        is_crit: bool,
        label: String,
    },
    Heal {
        target: UnitId,
        amount: f64,
        label: String,
    },
    Shield {
        target: UnitId,
        amount: f64,
        label: String,
    },
    Note(String),
}

/// One resolved entry of the battle log, in chronological order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub time: f64,
    pub round: u32,
    pub actor: UnitId,
    pub kind: LogKind,
    pub target: Option<UnitId>,
    pub total_damage: f64,
    pub total_healing: f64,
    pub total_shield: f64,
    pub details: Vec<LogDetail>,
}

impl LogEntry {
    pub fn new(time: f64, round: u32, actor: UnitId, kind: LogKind) -> Self {
        Self {
            time,
            round,
            actor,
            kind,
            target: None,
            total_damage: 0.0,
            total_healing: 0.0,
            total_shield: 0.0,
            details: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Option<UnitId>) -> Self {
        self.target = target;
        self
    }

    pub fn push(&mut self, detail: LogDetail) {
        match &detail {
            LogDetail::Damage { amount, .. } => self.total_damage += amount,
            LogDetail::Heal { amount, .. } => self.total_healing += amount,
            LogDetail::Shield { amount, .. } => self.total_shield += amount,
            LogDetail::Note(_) => {}
        }
        self.details.push(detail);
    }
}

/// Digest of a finished log, stable across runs with the same inputs.
///
/// Requires the `serde` feature; bincode encoding is deterministic.
#[cfg(feature = "serde")]
pub fn compute_log_root(log: &[LogEntry]) -> [u8; 32] {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for entry in log {
        if let Ok(bytes) = bincode::serialize(entry) {
            hasher.update(&bytes);
        }
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate_per_source() {
        let mut result = BattleResult::default();
        let a = UnitId::new("a");
        result.record_damage(&a, 100.0);
        result.record_damage(&a, 50.0);
        result.record_healing(&a, 30.0);

        assert_eq!(result.total_damage_dealt, 150.0);
        let totals = result.totals(&a).unwrap();
        assert_eq!(totals.damage_dealt, 150.0);
        assert_eq!(totals.healing_dealt, 30.0);
        assert_eq!(totals.shield_provided, 0.0);
    }

    #[test]
    fn log_entry_sums_details_by_kind() {
        let mut entry = LogEntry::new(0.0, 1, UnitId::new("a"), LogKind::Action(ActionKind::Skill));
        entry.push(LogDetail::Damage {
            target: UnitId::new("e"),
            kind: DamageKind::Direct,
            amount: 120.0,
            is_crit: false,
            label: "hit".into(),
        });
        entry.push(LogDetail::Shield {
            target: UnitId::new("a"),
            amount: 40.0,
            label: "shield".into(),
        });

        assert_eq!(entry.total_damage, 120.0);
        assert_eq!(entry.total_shield, 40.0);
        assert_eq!(entry.details.len(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn log_root_changes_with_content() {
        let entry = LogEntry::new(0.0, 1, UnitId::new("a"), LogKind::BattleStart);
        let empty = hex::encode(compute_log_root(&[]));
        let one = hex::encode(compute_log_root(std::slice::from_ref(&entry)));

        // SHA-256 of no input.
        assert_eq!(empty, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
        assert_ne!(one, empty);
        assert_eq!(one, hex::encode(compute_log_root(&[entry])));
    }
}
