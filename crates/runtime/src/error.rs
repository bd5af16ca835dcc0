//! Errors surfaced while turning a scenario into a finished battle.
//!
//! Scenario problems are rejected here, before the engine runs; once a
//! battle starts every outcome (including timeouts) is a report, not an error.

use combat_core::{CombatError, ErrorSeverity, RegistryError, RotationError, SimulationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown kit `{0}`")]
    UnknownKit(String),

    #[error("unknown light cone `{0}`")]
    UnknownLightCone(String),

    #[error("scenario has no party members")]
    EmptyParty,

    #[error("scenario has no enemies")]
    NoEnemies,

    #[error("invalid rotation for `{unit}`")]
    Rotation {
        unit: String,
        #[source]
        source: RotationError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("failed to encode report")]
    Encode(#[source] serde_json::Error),
}

impl CombatError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownKit(_)
            | Self::UnknownLightCone(_)
            | Self::EmptyParty
            | Self::NoEnemies
            | Self::Rotation { .. }
            | Self::Registry(_) => ErrorSeverity::Validation,
            Self::Simulation(err) => err.severity(),
            Self::Encode(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKit(_) => "RUNTIME_UNKNOWN_KIT",
            Self::UnknownLightCone(_) => "RUNTIME_UNKNOWN_LIGHT_CONE",
            Self::EmptyParty => "RUNTIME_EMPTY_PARTY",
            Self::NoEnemies => "RUNTIME_NO_ENEMIES",
            Self::Rotation { .. } => "RUNTIME_INVALID_ROTATION",
            Self::Registry(err) => err.error_code(),
            Self::Simulation(err) => err.error_code(),
            Self::Encode(_) => "RUNTIME_ENCODE",
        }
    }
}
