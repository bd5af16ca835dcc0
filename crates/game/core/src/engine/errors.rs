//! Errors surfaced by the simulation runner.

use super::turns::TurnError;
use crate::error::{CombatError, ErrorSeverity};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("battle has no characters")]
    NoAllies,

    #[error("battle has no enemies")]
    NoEnemies,

    #[error("turn scheduling failed: {0}")]
    Turn(#[from] TurnError),
}

impl CombatError for SimulationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoAllies | Self::NoEnemies => ErrorSeverity::Validation,
            Self::Turn(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoAllies => "SIMULATION_NO_ALLIES",
            Self::NoEnemies => "SIMULATION_NO_ENEMIES",
            Self::Turn(err) => err.error_code(),
        }
    }
}
