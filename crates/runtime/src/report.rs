//! Finished battle summary.

use std::fmt;

use combat_core::state::compute_log_root;
use combat_core::{BattleOutcome, BattleResult, GameState, LogEntry};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// Everything a caller needs from a finished battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub outcome: BattleOutcome,
    pub turn_count: u32,
    /// Action value elapsed when the battle ended.
    pub time: f64,
    pub result: BattleResult,
    pub log: Vec<LogEntry>,
    /// Hex SHA-256 over the bincode-encoded log; equal seeds give equal digests.
    pub digest: String,
}

impl SimulationReport {
    pub fn from_state(state: &GameState, seed: u64) -> Self {
        Self {
            seed,
            outcome: state.result.outcome.unwrap_or(BattleOutcome::Timeout),
            turn_count: state.turn_count,
            time: state.time,
            result: state.result.clone(),
            log: state.log.clone(),
            digest: hex::encode(compute_log_root(&state.log)),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(RuntimeError::Encode)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} after {} turns ({:.1} AV), seed {}",
            self.outcome, self.turn_count, self.time, self.seed
        )?;
        writeln!(f, "total damage: {:.0}", self.result.total_damage_dealt)?;
        for (unit, totals) in &self.result.character_stats {
            writeln!(
                f,
                "  {:<16} dmg {:>12.0}  heal {:>9.0}  shield {:>9.0}",
                unit.as_str(),
                totals.damage_dealt,
                totals.healing_dealt,
                totals.shield_provided
            )?;
        }
        write!(f, "log digest: {}", self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{CombatConfig, LogKind, UnitId, UnitRegistry};

    fn finished() -> GameState {
        let mut state = GameState::new(UnitRegistry::new(), CombatConfig::default());
        state.turn_count = 7;
        state.time = 312.5;
        state.result.record_damage(&UnitId::new("yanqing"), 12_345.0);
        state.result.outcome = Some(BattleOutcome::Victory);
        state.log.push(LogEntry::new(0.0, 1, UnitId::battle(), LogKind::BattleStart));
        state
    }

    #[test]
    fn report_copies_outcome_and_digest() {
        let report = SimulationReport::from_state(&finished(), 3);
        assert_eq!(report.outcome, BattleOutcome::Victory);
        assert_eq!(report.turn_count, 7);
        assert_eq!(report.digest.len(), 64);
        assert_eq!(report.digest, hex::encode(compute_log_root(&report.log)));
    }

    #[test]
    fn json_keeps_outcome_and_digest() {
        let report = SimulationReport::from_state(&finished(), 3);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"outcome\": \"victory\""));
        let back: SimulationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.digest, report.digest);
        assert_eq!(back.log.len(), report.log.len());
        assert_eq!(back.result.character_stats.len(), 1);
    }

    #[test]
    fn display_lists_each_character() {
        let text = SimulationReport::from_state(&finished(), 3).to_string();
        assert!(text.starts_with("victory after 7 turns"));
        assert!(text.contains("yanqing"));
        assert!(text.contains("12345"));
    }
}
