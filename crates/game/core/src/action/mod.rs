//! Actions and the static ability data they resolve against.
//!
//! # Module Structure
//!
//! - `ability`: per-unit ability definitions (damage, support, effects, costs)
//! - `targeting`: how an ability chooses its targets
//! - `rotation`: the per-character action policy ("s,b,b", ultimate timing)
//!
//! An [`Action`] is the execution instance handed to the dispatcher: who acts,
//! which ability slot, and the primary target.

pub mod ability;
pub mod rotation;
pub mod targeting;

pub use ability::{
    Ability, AbilityEffect, AbilitySet, DamageSpec, EffectTarget, HitSpec, ShieldSpec, SupportSpec,
};
pub use rotation::{RotationConfig, RotationError, RotationStep, UltimatePolicy};
pub use targeting::TargetType;

use strum::{Display, EnumIter, IntoStaticStr};

use crate::state::UnitId;

/// Ability slot an action resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionKind {
    Basic,
    EnhancedBasic,
    Skill,
    Ultimate,
    FollowUp,
}

impl ActionKind {
    /// Stat boosting damage dealt by this kind of action.
    pub const fn dmg_boost_stat(self) -> crate::stats::StatKey {
        use crate::stats::StatKey;
        match self {
            Self::Basic | Self::EnhancedBasic => StatKey::BasicAtkDmgBoost,
            Self::Skill => StatKey::SkillDmgBoost,
            Self::Ultimate => StatKey::UltDmgBoost,
            Self::FollowUp => StatKey::FuaDmgBoost,
        }
    }

    pub const fn is_basic(self) -> bool {
        matches!(self, Self::Basic | Self::EnhancedBasic)
    }
}

/// One action to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub kind: ActionKind,
    pub source: UnitId,
    /// Primary target; `None` lets the dispatcher pick one.
    pub target: Option<UnitId>,
}

impl Action {
    pub fn new(kind: ActionKind, source: UnitId) -> Self {
        Self {
            kind,
            source,
            target: None,
        }
    }

    #[must_use]
    pub fn targeting(mut self, target: UnitId) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets or clears the primary target.
    #[must_use]
    pub fn with_target(mut self, target: Option<UnitId>) -> Self {
        self.target = target;
        self
    }

    pub fn basic(source: UnitId) -> Self {
        Self::new(ActionKind::Basic, source)
    }

    pub fn skill(source: UnitId) -> Self {
        Self::new(ActionKind::Skill, source)
    }

    pub fn ultimate(source: UnitId) -> Self {
        Self::new(ActionKind::Ultimate, source)
    }

    pub fn follow_up(source: UnitId) -> Self {
        Self::new(ActionKind::FollowUp, source)
    }
}
