//! Stat modifiers contributed by equipment, traces and effects.

use super::StatKey;

/// How a modifier combines with the stat's base value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModifierOp {
    /// Flat addition (`+50 ATK`, `+0.2 crit rate`).
    #[default]
    Add,
    /// Percentage of the base value (`+20% ATK`).
    Multiply,
}

/// Whether an effect modifier is multiplied by the effect's stack count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StackScaling {
    #[default]
    PerStack,
    Fixed,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub stat: StatKey,
    pub value: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub op: ModifierOp,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: StackScaling,
}

impl Modifier {
    pub fn add(stat: StatKey, value: f64) -> Self {
        Self {
            stat,
            value,
            op: ModifierOp::Add,
            source: String::new(),
            scaling: StackScaling::PerStack,
        }
    }

    pub fn multiply(stat: StatKey, value: f64) -> Self {
        Self {
            op: ModifierOp::Multiply,
            ..Self::add(stat, value)
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Ignore the owning effect's stack count.
    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.scaling = StackScaling::Fixed;
        self
    }

    /// Value contributed when the owning effect has `stacks` stacks.
    pub fn effective_value(&self, stacks: u32) -> f64 {
        match self.scaling {
            StackScaling::PerStack => self.value * f64::from(stacks.max(1)),
            StackScaling::Fixed => self.value,
        }
    }
}

/// A skill-tree node. Stat nodes carry a modifier; ability nodes are looked up
/// by id from character handlers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trace {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus: Option<Modifier>,
}

impl Trace {
    pub fn ability(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bonus: None,
        }
    }

    pub fn stat(id: impl Into<String>, bonus: Modifier) -> Self {
        Self {
            id: id.into(),
            bonus: Some(bonus),
        }
    }
}
