//! Character kits: static data plus handler factories.
//!
//! A kit pairs a [`UnitBuilder`] (base stats, abilities, traces) with the
//! [`HandlerFactory`] that carries the character's bespoke behaviour. The
//! engine never sees kit ids; the runtime resolves them through
//! [`KitCatalog`] while assembling a battle.
//!
//! Base stats are the level 80 values. Ability levels assume maxed traces
//! and are raised by the eidolons that boost them.

pub mod boothill;
pub mod march_7th;
pub mod yanqing;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::BTreeMap;

use combat_core::{HandlerFactory, Unit, UnitId};

/// Builds the unit for a kit; the caller attaches equipment and calls
/// [`Unit::ready`].
pub type UnitBuilder = fn(id: UnitId, level: u32, eidolon: u8) -> Unit;

#[derive(Clone, Copy)]
pub struct Kit {
    pub id: &'static str,
    pub name: &'static str,
    pub build: UnitBuilder,
    pub handler: HandlerFactory,
}

impl Kit {
    /// Unit for this kit at `level` and `eidolon` (clamped to 6).
    pub fn unit(&self, id: UnitId, level: u32, eidolon: u8) -> Unit {
        (self.build)(id, level, eidolon.min(MAX_EIDOLON))
    }
}

pub const MAX_EIDOLON: u8 = 6;

/// Kits addressable by id.
#[derive(Clone, Default)]
pub struct KitCatalog {
    kits: BTreeMap<&'static str, Kit>,
}

impl KitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every bundled character.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.register(yanqing::KIT);
        catalog.register(march_7th::KIT);
        catalog.register(boothill::KIT);
        catalog
    }

    /// Adds `kit`, replacing any kit with the same id.
    pub fn register(&mut self, kit: Kit) {
        self.kits.insert(kit.id, kit);
    }

    pub fn get(&self, id: &str) -> Option<&Kit> {
        self.kits.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kits.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.kits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kits.is_empty()
    }
}

/// Value of an ability whose level is raised at eidolon `boost_at`.
pub(crate) fn leveled(eidolon: u8, boost_at: u8, base: f64, boosted: f64) -> f64 {
    if eidolon >= boost_at { boosted } else { base }
}
