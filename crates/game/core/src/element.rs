//! Damage elements and element sets.
//!
//! Every attacker deals damage of exactly one [`Element`]. Elements select the
//! damage boost, resistance, penetration and vulnerability stats used by the
//! damage formula, and the base multiplier used for weakness break damage.

use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::stats::StatKey;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Element {
    Physical,
    Fire,
    Ice,
    Lightning,
    Wind,
    Quantum,
    Imaginary,
}

impl Element {
    /// Element multiplier applied to weakness break damage.
    pub const fn break_multiplier(self) -> f64 {
        match self {
            Self::Physical | Self::Fire => 2.0,
            Self::Wind => 1.5,
            Self::Ice | Self::Lightning => 1.0,
            Self::Quantum | Self::Imaginary => 0.5,
        }
    }

    pub const fn dmg_boost_stat(self) -> StatKey {
        match self {
            Self::Physical => StatKey::PhysicalDmgBoost,
            Self::Fire => StatKey::FireDmgBoost,
            Self::Ice => StatKey::IceDmgBoost,
            Self::Lightning => StatKey::LightningDmgBoost,
            Self::Wind => StatKey::WindDmgBoost,
            Self::Quantum => StatKey::QuantumDmgBoost,
            Self::Imaginary => StatKey::ImaginaryDmgBoost,
        }
    }

    pub const fn res_stat(self) -> StatKey {
        match self {
            Self::Physical => StatKey::PhysicalRes,
            Self::Fire => StatKey::FireRes,
            Self::Ice => StatKey::IceRes,
            Self::Lightning => StatKey::LightningRes,
            Self::Wind => StatKey::WindRes,
            Self::Quantum => StatKey::QuantumRes,
            Self::Imaginary => StatKey::ImaginaryRes,
        }
    }

    pub const fn res_pen_stat(self) -> StatKey {
        match self {
            Self::Physical => StatKey::PhysicalResPen,
            Self::Fire => StatKey::FireResPen,
            Self::Ice => StatKey::IceResPen,
            Self::Lightning => StatKey::LightningResPen,
            Self::Wind => StatKey::WindResPen,
            Self::Quantum => StatKey::QuantumResPen,
            Self::Imaginary => StatKey::ImaginaryResPen,
        }
    }

    pub const fn vuln_stat(self) -> StatKey {
        match self {
            Self::Physical => StatKey::PhysicalVuln,
            Self::Fire => StatKey::FireVuln,
            Self::Ice => StatKey::IceVuln,
            Self::Lightning => StatKey::LightningVuln,
            Self::Wind => StatKey::WindVuln,
            Self::Quantum => StatKey::QuantumVuln,
            Self::Imaginary => StatKey::ImaginaryVuln,
        }
    }

    /// Single-element set containing this element.
    pub const fn flag(self) -> ElementSet {
        match self {
            Self::Physical => ElementSet::PHYSICAL,
            Self::Fire => ElementSet::FIRE,
            Self::Ice => ElementSet::ICE,
            Self::Lightning => ElementSet::LIGHTNING,
            Self::Wind => ElementSet::WIND,
            Self::Quantum => ElementSet::QUANTUM,
            Self::Imaginary => ElementSet::IMAGINARY,
        }
    }
}

bitflags! {
    /// Set of elements, used for weaknesses.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ElementSet: u8 {
        const PHYSICAL = 1 << 0;
        const FIRE = 1 << 1;
        const ICE = 1 << 2;
        const LIGHTNING = 1 << 3;
        const WIND = 1 << 4;
        const QUANTUM = 1 << 5;
        const IMAGINARY = 1 << 6;
    }
}

impl ElementSet {
    pub fn has(self, element: Element) -> bool {
        self.contains(element.flag())
    }

    #[must_use]
    pub fn with(self, element: Element) -> Self {
        self | element.flag()
    }

    #[must_use]
    pub fn without(self, element: Element) -> Self {
        self - element.flag()
    }

    /// Elements contained in this set, in declaration order.
    pub fn elements(self) -> impl Iterator<Item = Element> {
        Element::iter().filter(move |element| self.has(*element))
    }
}

impl FromIterator<Element> for ElementSet {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ElementSet::empty(), |set, element| set.with(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_set_round_trips_through_iterator() {
        let set: ElementSet = [Element::Ice, Element::Quantum].into_iter().collect();

        assert!(set.has(Element::Ice));
        assert!(!set.has(Element::Fire));
        assert_eq!(
            set.elements().collect::<Vec<_>>(),
            vec![Element::Ice, Element::Quantum]
        );
        assert!(!set.without(Element::Ice).has(Element::Ice));
    }

    #[test]
    fn element_names_are_snake_case() {
        assert_eq!(Element::Imaginary.to_string(), "imaginary");
        assert_eq!("lightning".parse::<Element>(), Ok(Element::Lightning));
    }
}
