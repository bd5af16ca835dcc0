//! Side effects an effect performs on its owner beyond stat modifiers.

use crate::element::Element;
use crate::state::Unit;

/// Apply/remove side effect attached to an [`Effect`](super::Effect).
///
/// Hooks run against the effect's owner. `apply` runs once per
/// (re)application, `remove` once after the effect leaves the owner's list.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectHook {
    /// Grants a temporary weakness to `element`.
    ///
    /// `innate` is resolved on apply: true when the owner already had the
    /// weakness on its own, in which case removal leaves it in place.
    GrantWeakness { element: Element, innate: bool },
    /// Adds a shield of `amount` to the owner; removed amount is floored at 0.
    Shield { amount: f64 },
}

impl EffectHook {
    pub fn grant_weakness(element: Element) -> Self {
        Self::GrantWeakness {
            element,
            innate: false,
        }
    }

    pub fn shield(amount: f64) -> Self {
        Self::Shield {
            amount: amount.max(0.0),
        }
    }

    /// Runs the apply side effect and returns the hook with any state it
    /// captured (e.g. whether a weakness was innate).
    ///
    /// The effect carrying this hook must not be in `owner.effects` yet.
    pub fn apply(self, owner: &mut Unit) -> Self {
        match self {
            Self::GrantWeakness { element, .. } => {
                let granted_elsewhere = grants_weakness(owner, element);
                let innate = owner.weaknesses.has(element) && !granted_elsewhere;
                owner.weaknesses = owner.weaknesses.with(element);
                Self::GrantWeakness { element, innate }
            }
            Self::Shield { amount } => {
                owner.shield += amount;
                self
            }
        }
    }

    /// Reverts the apply side effect.
    ///
    /// The effect carrying this hook must already be gone from `owner.effects`.
    pub fn remove(&self, owner: &mut Unit) {
        match *self {
            Self::GrantWeakness { element, innate } => {
                if !innate && !grants_weakness(owner, element) {
                    owner.weaknesses = owner.weaknesses.without(element);
                }
            }
            Self::Shield { amount } => {
                owner.shield = (owner.shield - amount).max(0.0);
            }
        }
    }
}

fn grants_weakness(owner: &Unit, element: Element) -> bool {
    owner.effects.iter().any(|effect| {
        matches!(
            effect.hook,
            Some(EffectHook::GrantWeakness { element: granted, .. }) if granted == element
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;
    use crate::element::ElementSet;
    use crate::state::UnitId;

    fn enemy(weaknesses: ElementSet) -> Unit {
        Unit::enemy(UnitId::new("e1"), "Dummy", 80).with_weaknesses(weaknesses)
    }

    #[test]
    fn granted_weakness_is_cleared_on_remove() {
        let mut owner = enemy(ElementSet::empty());
        let hook = EffectHook::grant_weakness(Element::Physical).apply(&mut owner);
        assert!(owner.weaknesses.has(Element::Physical));

        hook.remove(&mut owner);
        assert!(!owner.weaknesses.has(Element::Physical));
    }

    #[test]
    fn innate_weakness_survives_remove() {
        let mut owner = enemy(ElementSet::from_iter([Element::Physical]));
        let hook = EffectHook::grant_weakness(Element::Physical).apply(&mut owner);
        assert_eq!(
            hook,
            EffectHook::GrantWeakness {
                element: Element::Physical,
                innate: true
            }
        );

        hook.remove(&mut owner);
        assert!(owner.weaknesses.has(Element::Physical));
    }

    #[test]
    fn weakness_granted_by_another_effect_is_kept() {
        let mut owner = enemy(ElementSet::empty());
        let first = EffectHook::grant_weakness(Element::Fire).apply(&mut owner);
        owner.effects.push(
            Effect::debuff("first", "First", UnitId::new("a")).with_hook(first),
        );

        let second = EffectHook::grant_weakness(Element::Fire).apply(&mut owner);
        assert_eq!(
            second,
            EffectHook::GrantWeakness {
                element: Element::Fire,
                innate: false
            }
        );

        // "first" is still active, so removing the second grant keeps the weakness
        second.remove(&mut owner);
        assert!(owner.weaknesses.has(Element::Fire));
    }

    #[test]
    fn shield_removal_never_goes_negative() {
        let mut owner = enemy(ElementSet::empty());
        let hook = EffectHook::shield(300.0).apply(&mut owner);
        assert_eq!(owner.shield, 300.0);

        owner.shield = 100.0;
        hook.remove(&mut owner);
        assert_eq!(owner.shield, 0.0);
    }
}
