//! Common error infrastructure for combat-core.
//!
//! Missing references (unknown unit or effect ids) are not errors: engine
//! operations return the state unchanged. Errors are reserved for setup and
//! invariant violations that must be rejected before a battle runs.
//!
//! Domain-specific errors (`RegistryError`, `RotationError`,
//! `SimulationError`, `TurnError`) live next to the code that raises them and
//! implement [`CombatError`].

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input that should be fixed by the caller (bad scenario data).
    Validation,

    /// Inconsistent engine or character data. These indicate bugs.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by who has to fix it, not by impact
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for logs and tests.
    fn error_code(&self) -> &'static str;
}
