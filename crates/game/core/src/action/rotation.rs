//! Per-character action policy.

use core::str::FromStr;

use crate::state::UnitId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RotationError {
    #[error("rotation is empty")]
    Empty,

    #[error("unknown rotation step `{0}` (expected `s` or `b`)")]
    UnknownStep(String),
}

impl crate::error::CombatError for RotationError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "ROTATION_EMPTY",
            Self::UnknownStep(_) => "ROTATION_UNKNOWN_STEP",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RotationStep {
    Basic,
    Skill,
}

impl FromStr for RotationStep {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "b" | "basic" => Ok(Self::Basic),
            "s" | "skill" => Ok(Self::Skill),
            other => Err(RotationError::UnknownStep(other.to_owned())),
        }
    }
}

/// When a character with full energy uses its ultimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UltimatePolicy {
    /// Interrupts the timeline as soon as energy is full.
    #[default]
    Immediate,
    /// Replaces the character's next own action.
    OnTurn,
    Never,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotationConfig {
    pub sequence: Vec<RotationStep>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ultimate: UltimatePolicy,
    /// Preferred ally for supportive skills; defaults to the caster.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill_target: Option<UnitId>,
}

impl RotationConfig {
    /// Parses a comma-separated sequence such as `"s,b,b"`.
    pub fn parse(sequence: &str) -> Result<Self, RotationError> {
        let steps = sequence
            .split(',')
            .filter(|step| !step.trim().is_empty())
            .map(RotationStep::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(steps)
    }

    pub fn new(sequence: Vec<RotationStep>) -> Result<Self, RotationError> {
        if sequence.is_empty() {
            return Err(RotationError::Empty);
        }
        Ok(Self {
            sequence,
            ultimate: UltimatePolicy::default(),
            skill_target: None,
        })
    }

    #[must_use]
    pub fn with_ultimate(mut self, policy: UltimatePolicy) -> Self {
        self.ultimate = policy;
        self
    }

    #[must_use]
    pub fn with_skill_target(mut self, target: UnitId) -> Self {
        self.skill_target = Some(target);
        self
    }

    /// Step at rotation position `index` (wraps around).
    pub fn step(&self, index: usize) -> RotationStep {
        if self.sequence.is_empty() {
            return RotationStep::Basic;
        }
        self.sequence[index % self.sequence.len()]
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            sequence: vec![RotationStep::Skill],
            ultimate: UltimatePolicy::Immediate,
            skill_target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_sequence() {
        let rotation = RotationConfig::parse("s, b,b").unwrap();
        assert_eq!(
            rotation.sequence,
            vec![RotationStep::Skill, RotationStep::Basic, RotationStep::Basic]
        );
        assert_eq!(rotation.step(4), RotationStep::Basic);
        assert_eq!(rotation.step(3), RotationStep::Skill);
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert_eq!(
            RotationConfig::parse("s,x"),
            Err(RotationError::UnknownStep("x".to_owned()))
        );
        assert_eq!(RotationConfig::parse(" , "), Err(RotationError::Empty));
    }
}
