//! Targeting modes for abilities.

/// How an ability selects the units it hits or supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetType {
    /// One opponent.
    #[default]
    SingleEnemy,
    /// Primary opponent plus its neighbours in slot order.
    Blast,
    /// First hit on the primary, every later hit on a random alive opponent.
    Bounce,
    AllEnemies,
    SingleAlly,
    AllAllies,
    SelfOnly,
}

impl TargetType {
    /// True when the ability is aimed at the caster's own side.
    pub const fn is_supportive(self) -> bool {
        matches!(self, Self::SingleAlly | Self::AllAllies | Self::SelfOnly)
    }
}
