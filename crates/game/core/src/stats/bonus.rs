//! Bonus application for a single stat.
//!
//! Calculation order: `Increased → Flat`
//!
//! Percentage bonuses scale the base value only; flat bonuses are added after.
//! This matches how equipment and buffs combine on the character sheet:
//! `+20% ATK` never scales the `+50 ATK` from a relic.

use super::{Modifier, ModifierOp};

/// A single bonus that can be applied to a stat value.
///
/// - **Flat**: additive, applied last (`+50 ATK`, `+0.2 crit rate`)
/// - **Increased**: fraction of the base, summed (`0.2` = +20%)
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(f64),
    Increased(f64),
}

impl Bonus {
    pub fn flat(value: f64) -> Self {
        Bonus::Flat(value)
    }

    pub fn increased(fraction: f64) -> Self {
        Bonus::Increased(fraction)
    }

    /// Converts a modifier contribution (already scaled by stacks).
    pub fn from_modifier(modifier: &Modifier, stacks: u32) -> Self {
        let value = modifier.effective_value(stacks);
        match modifier.op {
            ModifierOp::Add => Bonus::Flat(value),
            ModifierOp::Multiply => Bonus::Increased(value),
        }
    }
}

/// Accumulated bonuses for one stat.
///
/// # Example
/// ```
/// # use combat_core::stats::bonus::{Bonus, BonusStack};
/// let mut stack = BonusStack::new();
/// stack.add(Bonus::increased(0.2));   // +20%
/// stack.add(Bonus::increased(0.1));   // +10% (summed)
/// stack.add(Bonus::flat(50.0));       // +50
///
/// // 500 × 1.3 + 50 = 700
/// assert_eq!(stack.apply(500.0), 700.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BonusStack {
    flat: f64,
    increased: f64,
}

impl BonusStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bonus: Bonus) {
        match bonus {
            Bonus::Flat(value) => self.flat += value,
            Bonus::Increased(fraction) => self.increased += fraction,
        }
    }

    pub fn extend(&mut self, bonuses: impl IntoIterator<Item = Bonus>) {
        for bonus in bonuses {
            self.add(bonus);
        }
    }

    /// # Formula
    /// ```text
    /// result = base × (1 + Σincreased) + Σflat
    /// ```
    pub fn apply(&self, base: f64) -> f64 {
        base * (1.0 + self.increased) + self.flat
    }

    pub fn is_empty(&self) -> bool {
        self.flat == 0.0 && self.increased == 0.0
    }

    /// Add a flat bonus (builder pattern)
    #[must_use]
    pub fn flat(mut self, value: f64) -> Self {
        self.add(Bonus::flat(value));
        self
    }

    /// Add a percentage increase (builder pattern)
    #[must_use]
    pub fn increased(mut self, fraction: f64) -> Self {
        self.add(Bonus::increased(fraction));
        self
    }
}
