//! Buffs, debuffs and their lifecycle.
//!
//! # Architecture
//!
//! - [`Effect`]: the instance attached to a unit (modifiers, duration, tags)
//! - [`EffectHook`]: side effects beyond stat modifiers (weakness grants, shields)
//! - [`manager`]: add / remove / advance / stack, linked-effect cascade
//! - [`library`]: effects the engine itself applies (break statuses, shields)
//! - [`aura`]: field-wide modifiers projected by a living source
//! - [`accumulator`]: named counters kept on a permanent buff
//!
//! # Lifecycle
//!
//! ```text
//! add_effect ──► hook.apply ──► stats::recalculate
//!      │
//!      ├─ same id + stacking ─► stacks = min(old + new, max)
//!      └─ same id, no stacking ─► replaced (duration/modifiers refreshed)
//!
//! turn boundary ──► duration -= 1 ──► 0 ──► remove_effect
//!
//! remove_effect ──► hook.remove ──► cascade to effects linked to this id
//! ```

pub mod accumulator;
pub mod aura;
pub mod capability;
pub mod hook;
pub mod library;
pub mod manager;

pub use aura::{
    Aura, AuraTarget, add_aura, aura_modifiers_for, refresh_auras, remove_aura,
    remove_auras_by_source,
};
pub use capability::Capability;
pub use hook::EffectHook;
pub use manager::{
    add_effect, advance_crowd_control, advance_effects_on_turn_end, advance_effects_on_turn_start,
    cleanse, dispel, remove_effect, remove_effects_where,
};

use strum::{Display, IntoStaticStr};

use crate::state::{EffectId, UnitId};
use crate::stats::{Modifier, StatKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectCategory {
    Buff,
    Debuff,
    Other,
}

/// When an effect's remaining duration ticks down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DurationType {
    /// Never expires on its own.
    Permanent,
    /// Decremented at the start of the owner's turn.
    TurnStartBased,
    /// Decremented at the end of the owner's turn.
    TurnEndBased,
    /// Lives exactly as long as the effect named by `linked_effect_id`.
    Linked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stacking {
    pub count: u32,
    pub max: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DotKind {
    Bleed,
    Burn,
    Shock,
    WindShear,
    /// Damage dealt when a frozen unit thaws.
    Frozen,
    /// Damage dealt when an entangled unit's turn comes.
    Entanglement,
}

/// Damage carried by a DoT or crowd-control status.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DotDamage {
    /// Break-style damage: fixed base per stack, scaled by the source's break effect.
    Break { base: f64 },
    /// Character-style damage: source stat × multiplier, scaled by DoT boosts.
    Scaling { stat: StatKey, multiplier: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DotSpec {
    pub kind: DotKind,
    pub damage: DotDamage,
}

/// A buff or debuff instance attached to a unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub id: EffectId,
    pub name: String,
    pub source: UnitId,
    pub category: EffectCategory,
    pub duration_type: DurationType,
    /// Remaining ticks; `-1` for permanent and linked effects.
    pub duration: i32,
    /// Skip the decrement at the end of the turn this effect was applied in,
    /// when that turn is the owner's own.
    pub skip_first_turn_decrement: bool,
    pub stacking: Option<Stacking>,
    pub modifiers: Vec<Modifier>,
    pub tags: Capability,
    pub linked_effect_id: Option<EffectId>,
    pub hook: Option<EffectHook>,
    pub dot: Option<DotSpec>,
    /// Free numeric slot, used by accumulators.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: f64,
    /// Set when applied during the owner's turn with `skip_first_turn_decrement`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pending_skip: bool,
}

impl Effect {
    pub fn new(
        id: impl Into<EffectId>,
        name: impl Into<String>,
        source: UnitId,
        category: EffectCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source,
            category,
            duration_type: DurationType::Permanent,
            duration: -1,
            skip_first_turn_decrement: false,
            stacking: None,
            modifiers: Vec::new(),
            tags: Capability::empty(),
            linked_effect_id: None,
            hook: None,
            dot: None,
            value: 0.0,
            pending_skip: false,
        }
    }

    pub fn buff(id: impl Into<EffectId>, name: impl Into<String>, source: UnitId) -> Self {
        Self::new(id, name, source, EffectCategory::Buff)
    }

    pub fn debuff(id: impl Into<EffectId>, name: impl Into<String>, source: UnitId) -> Self {
        Self::new(id, name, source, EffectCategory::Debuff)
    }

    #[must_use]
    pub fn turn_end_based(mut self, turns: i32) -> Self {
        self.duration_type = DurationType::TurnEndBased;
        self.duration = turns;
        self
    }

    #[must_use]
    pub fn turn_start_based(mut self, turns: i32) -> Self {
        self.duration_type = DurationType::TurnStartBased;
        self.duration = turns;
        self
    }

    #[must_use]
    pub fn permanent(mut self) -> Self {
        self.duration_type = DurationType::Permanent;
        self.duration = -1;
        self
    }

    /// Ties this effect's lifetime to effect `id` (usually on another unit).
    #[must_use]
    pub fn linked_to(mut self, id: impl Into<EffectId>) -> Self {
        self.duration_type = DurationType::Linked;
        self.duration = -1;
        self.linked_effect_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn skipping_first_decrement(mut self) -> Self {
        self.skip_first_turn_decrement = true;
        self
    }

    #[must_use]
    pub fn with_stacks(mut self, count: u32, max: u32) -> Self {
        let max = max.max(1);
        self.stacking = Some(Stacking {
            count: count.min(max),
            max,
        });
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Capability) -> Self {
        self.tags |= tags;
        self
    }

    #[must_use]
    pub fn with_hook(mut self, hook: EffectHook) -> Self {
        self.hook = Some(hook);
        self
    }

    #[must_use]
    pub fn with_dot(mut self, kind: DotKind, damage: DotDamage) -> Self {
        self.dot = Some(DotSpec { kind, damage });
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn stack_count(&self) -> u32 {
        self.stacking.map_or(1, |stacking| stacking.count)
    }

    pub fn is_buff(&self) -> bool {
        self.category == EffectCategory::Buff
    }

    pub fn is_debuff(&self) -> bool {
        self.category == EffectCategory::Debuff
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.tags.contains(capability)
    }
}
