//! Static ability data.
//!
//! Abilities are plain data: the dispatcher resolves them generically. All
//! character-specific behaviour lives in handlers, not here.

use super::{ActionKind, TargetType};
use crate::effect::Effect;
use crate::stats::StatKey;

/// One hit of a damaging ability.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitSpec {
    /// Fraction of the scaling stat dealt by this hit.
    pub multiplier: f64,
    pub toughness_reduction: f64,
}

impl HitSpec {
    pub fn new(multiplier: f64, toughness_reduction: f64) -> Self {
        Self {
            multiplier,
            toughness_reduction,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSpec {
    pub scaling: StatKey,
    pub hits: Vec<HitSpec>,
    /// Multiplier share dealt to blast neighbours (their toughness reduction is halved).
    #[cfg_attr(feature = "serde", serde(default))]
    pub adjacent_multiplier: f64,
}

impl DamageSpec {
    pub fn new(scaling: StatKey, hits: Vec<HitSpec>) -> Self {
        Self {
            scaling,
            hits,
            adjacent_multiplier: 0.0,
        }
    }

    pub fn total_multiplier(&self) -> f64 {
        self.hits.iter().map(|hit| hit.multiplier).sum()
    }
}

/// Healing or shield strength: `stat × multiplier + flat`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupportSpec {
    pub scaling: StatKey,
    pub multiplier: f64,
    pub flat: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShieldSpec {
    pub amount: SupportSpec,
    /// Owner turns the shield lasts.
    pub duration: i32,
}

/// Who receives an ability's effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectTarget {
    /// The action's primary target.
    Primary,
    AllOpponents,
    AllAllies,
    Caster,
}

/// An effect applied after the ability's hits resolve.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityEffect {
    pub effect: Effect,
    pub target: EffectTarget,
    /// Base chance for debuffs; `None` always applies.
    pub chance: Option<f64>,
    /// Fixed chances ignore effect hit rate and effect resistance.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fixed_chance: bool,
}

impl AbilityEffect {
    pub fn new(effect: Effect, target: EffectTarget) -> Self {
        Self {
            effect,
            target,
            chance: None,
            fixed_chance: false,
        }
    }

    #[must_use]
    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = Some(chance);
        self
    }

    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.fixed_chance = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub id: String,
    pub name: String,
    pub target: TargetType,
    pub damage: Option<DamageSpec>,
    pub heal: Option<SupportSpec>,
    pub shield: Option<ShieldSpec>,
    /// Energy the caster gains on use, before energy regeneration rate.
    pub energy_gain: f64,
    pub sp_cost: u32,
    pub sp_gain: u32,
    pub effects: Vec<AbilityEffect>,
}

impl Ability {
    pub fn new(id: impl Into<String>, name: impl Into<String>, target: TargetType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target,
            damage: None,
            heal: None,
            shield: None,
            energy_gain: 0.0,
            sp_cost: 0,
            sp_gain: 0,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_damage(mut self, damage: DamageSpec) -> Self {
        self.damage = Some(damage);
        self
    }

    /// Single-hit damage scaling off `scaling`.
    #[must_use]
    pub fn with_hit(self, scaling: StatKey, multiplier: f64, toughness: f64) -> Self {
        self.with_damage(DamageSpec::new(
            scaling,
            vec![HitSpec::new(multiplier, toughness)],
        ))
    }

    #[must_use]
    pub fn with_adjacent_multiplier(mut self, multiplier: f64) -> Self {
        if let Some(damage) = self.damage.as_mut() {
            damage.adjacent_multiplier = multiplier;
        }
        self
    }

    #[must_use]
    pub fn with_heal(mut self, heal: SupportSpec) -> Self {
        self.heal = Some(heal);
        self
    }

    #[must_use]
    pub fn with_shield(mut self, amount: SupportSpec, duration: i32) -> Self {
        self.shield = Some(ShieldSpec { amount, duration });
        self
    }

    #[must_use]
    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy_gain = energy;
        self
    }

    #[must_use]
    pub fn with_sp_cost(mut self, cost: u32) -> Self {
        self.sp_cost = cost;
        self
    }

    #[must_use]
    pub fn with_sp_gain(mut self, gain: u32) -> Self {
        self.sp_gain = gain;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: AbilityEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// A unit's ability slots.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilitySet {
    pub basic: Option<Ability>,
    pub enhanced_basic: Option<Ability>,
    pub skill: Option<Ability>,
    pub ultimate: Option<Ability>,
    pub follow_up: Option<Ability>,
}

impl AbilitySet {
    pub fn for_kind(&self, kind: ActionKind) -> Option<&Ability> {
        match kind {
            ActionKind::Basic => self.basic.as_ref(),
            ActionKind::EnhancedBasic => self.enhanced_basic.as_ref().or(self.basic.as_ref()),
            ActionKind::Skill => self.skill.as_ref(),
            ActionKind::Ultimate => self.ultimate.as_ref(),
            ActionKind::FollowUp => self.follow_up.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enhanced_basic_falls_back_to_basic() {
        let set = AbilitySet {
            basic: Some(Ability::new("basic", "Basic", TargetType::SingleEnemy)),
            ..AbilitySet::default()
        };
        assert_eq!(
            set.for_kind(ActionKind::EnhancedBasic).map(|a| a.id.as_str()),
            Some("basic")
        );
        assert!(set.for_kind(ActionKind::FollowUp).is_none());
    }

    #[test]
    fn total_multiplier_sums_hits() {
        let damage = DamageSpec::new(
            StatKey::Atk,
            vec![HitSpec::new(0.25, 5.0), HitSpec::new(0.75, 5.0)],
        );
        assert_eq!(damage.total_multiplier(), 1.0);
    }
}
