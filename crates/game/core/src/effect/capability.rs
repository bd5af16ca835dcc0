use bitflags::bitflags;

bitflags! {
    /// Capability markers carried by effects.
    ///
    /// Tags let unrelated systems ask "is this unit taunted?" or "does this
    /// unit skip its turn?" without knowing which character applied the
    /// effect.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Capability: u32 {
        /// Forces the owner's single-target attacks onto the effect source.
        const TAUNT = 1 << 0;
        /// Basic attack is replaced by the enhanced basic attack.
        const ENHANCED_BASIC = 1 << 1;
        /// Skill cannot be used; the rotation falls back to basic attacks.
        const SKILL_SILENCE = 1 << 2;
        /// Acting does not end the owner's turn.
        const PREVENT_TURN_END = 1 << 3;
        /// Broken toughness is not restored at the owner's turn start.
        const SKIP_TOUGHNESS_RECOVERY = 1 << 4;

        // ===== crowd control =====
        const FREEZE = 1 << 5;
        const ENTANGLEMENT = 1 << 6;
        const IMPRISONMENT = 1 << 7;
        /// Any status that makes the owner skip its action.
        const CROWD_CONTROL = Self::FREEZE.bits() | Self::ENTANGLEMENT.bits() | Self::IMPRISONMENT.bits();

        // ===== damage and protection =====
        /// Deals damage at the owner's turn start.
        const DOT = 1 << 8;
        const SHIELD = 1 << 9;
        /// Applied by a weakness break.
        const BREAK_STATUS = 1 << 10;
        /// Removed when the owner actually loses HP.
        const REMOVED_ON_HP_LOSS = 1 << 11;

        // ===== removal =====
        const CLEANSABLE = 1 << 12;
        const DISPELLABLE = 1 << 13;
    }
}
