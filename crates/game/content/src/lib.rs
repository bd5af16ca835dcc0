//! Character kits and scenario loaders.
//!
//! This crate houses the static character data the engine stays ignorant of:
//! - Character kits: base stats, abilities, traces and the handler factory
//!   carrying each character's bespoke behaviour
//! - Light cones: base stats, passive stat lines and conditional passives
//! - Scenario files (data-driven via TOML or RON): party, enemies and battle
//!   options
//!
//! Kits are resolved by id at assembly time and never appear in game state;
//! only the units they build and the handlers they register do.

pub mod kits;
pub mod light_cones;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use kits::{Kit, KitCatalog, MAX_EIDOLON, UnitBuilder};
pub use light_cones::{LightCone, LightConeCatalog, LightConeHandler, MAX_SUPERIMPOSITION};

#[cfg(feature = "loaders")]
pub use loaders::{
    EnemySpec, LightConeSpec, LoadResult, PartyMemberSpec, Scenario, ScenarioLoader,
    ScenarioOptions,
};
