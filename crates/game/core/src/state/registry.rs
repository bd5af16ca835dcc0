//! Unit registry.
//!
//! Units keep their insertion order (party slot order, then enemies), which is
//! the tie-break order for scheduling and the iteration order for every
//! "all allies"/"all enemies" query.

use crate::state::{Unit, UnitId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate unit id `{0}`")]
    DuplicateUnit(UnitId),
}

impl crate::error::CombatError for RegistryError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateUnit(_) => "REGISTRY_DUPLICATE_UNIT",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitRegistry {
    units: Vec<Unit>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry, rejecting duplicate ids.
    pub fn from_units(units: impl IntoIterator<Item = Unit>) -> Result<Self, RegistryError> {
        units
            .into_iter()
            .try_fold(Self::new(), |registry, unit| registry.insert(unit))
    }

    pub fn insert(mut self, unit: Unit) -> Result<Self, RegistryError> {
        if self.contains(&unit.id) {
            return Err(RegistryError::DuplicateUnit(unit.id));
        }
        self.units.push(unit);
        Ok(self)
    }

    pub fn get(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| &unit.id == id)
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: &UnitId) -> Option<usize> {
        self.units.iter().position(|unit| &unit.id == id)
    }

    /// Replaces unit `id` with `f(unit)`. Unknown ids leave the registry as is.
    #[must_use]
    pub fn update(mut self, id: &UnitId, f: impl FnOnce(Unit) -> Unit) -> Self {
        if let Some(index) = self.position(id) {
            let unit = self.units.remove(index);
            self.units.insert(index, f(unit));
        }
        self
    }

    /// Applies `f` to every unit in order.
    #[must_use]
    pub fn update_all(self, f: impl FnMut(Unit) -> Unit) -> Self {
        Self {
            units: self.units.into_iter().map(f).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn ids(&self) -> Vec<UnitId> {
        self.units.iter().map(|unit| unit.id.clone()).collect()
    }

    pub fn alive_enemies(&self) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|unit| unit.is_enemy() && unit.is_alive())
            .collect()
    }

    pub fn alive_allies(&self) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|unit| unit.is_ally() && unit.is_alive())
            .collect()
    }

    /// Alive units on the opposing side of `unit`.
    pub fn alive_opponents_of(&self, unit: &Unit) -> Vec<&Unit> {
        if unit.is_enemy() {
            self.alive_allies()
        } else {
            self.alive_enemies()
        }
    }

    /// Alive units on the same side as `unit`, including itself.
    pub fn alive_teammates_of(&self, unit: &Unit) -> Vec<&Unit> {
        if unit.is_enemy() {
            self.alive_enemies()
        } else {
            self.alive_allies()
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
