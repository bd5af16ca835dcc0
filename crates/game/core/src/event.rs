//! Typed combat events.
//!
//! Events are immutable once published. Handlers that want to influence the
//! hit being resolved write into the action context's damage modifiers
//! instead of mutating the event.

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::action::ActionKind;
use crate::effect::DotKind;
use crate::state::{EffectId, UnitId};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumCount, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventKind {
    BattleStart,
    TurnStart,
    TurnEnd,

    // ===== per hit =====
    BeforeDamageCalculation,
    AfterHit,
    DamageDealt,
    WeaknessBreak,
    EnemyDefeated,
    UnitDefeated,

    // ===== per action =====
    BasicAttack,
    EnhancedBasicAttack,
    SkillUsed,
    UltimateUsed,
    FollowUpAttack,
    ActionComplete,

    // ===== support and effects =====
    UnitHealed,
    ShieldApplied,
    EffectApplied,
    EffectRemoved,
    DebuffApplied,
    DotDamage,
    EnergyFull,
}

impl EventKind {
    /// Event announcing that an action of `kind` was used.
    pub const fn for_action(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Basic => Self::BasicAttack,
            ActionKind::EnhancedBasic => Self::EnhancedBasicAttack,
            ActionKind::Skill => Self::SkillUsed,
            ActionKind::Ultimate => Self::UltimateUsed,
            ActionKind::FollowUp => Self::FollowUpAttack,
        }
    }
}

/// How a unit lost HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageKind {
    /// Ability hit.
    Direct,
    /// Extra damage instance triggered by a passive.
    Additional,
    Break,
    SuperBreak,
    Dot,
    /// Self-inflicted HP consumption.
    HpCost,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventPayload {
    #[default]
    None,
    Hit {
        hit_index: usize,
        multiplier: f64,
        toughness_reduction: f64,
        is_main_target: bool,
    },
    Damage {
        damage_kind: DamageKind,
        is_crit: bool,
        shield_absorbed: f64,
        previous_hp_ratio: f64,
        current_hp_ratio: f64,
        killed: bool,
    },
    Dot {
        kind: DotKind,
        effect: EffectId,
    },
    Effect {
        effect: EffectId,
    },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub kind: EventKind,
    pub source: UnitId,
    pub target: Option<UnitId>,
    /// Action being resolved when the event fired.
    pub action: Option<ActionKind>,
    pub value: f64,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(kind: EventKind, source: UnitId) -> Self {
        Self {
            kind,
            source,
            target: None,
            action: None,
            value: 0.0,
            payload: EventPayload::None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: UnitId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: Option<ActionKind>) -> Self {
        self.action = action;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn is_from(&self, unit: &UnitId) -> bool {
        &self.source == unit
    }

    pub fn targets(&self, unit: &UnitId) -> bool {
        self.target.as_ref() == Some(unit)
    }

    /// Damage payload details, if any.
    pub fn damage(&self) -> Option<(DamageKind, bool)> {
        match self.payload {
            EventPayload::Damage {
                damage_kind,
                is_crit,
                ..
            } => Some((damage_kind, is_crit)),
            _ => None,
        }
    }

    pub fn killed(&self) -> bool {
        matches!(self.payload, EventPayload::Damage { killed: true, .. })
    }
}
