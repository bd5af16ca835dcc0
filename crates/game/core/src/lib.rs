//! Deterministic turn-based combat engine.
//!
//! `combat-core` defines the canonical battle rules (units, stats, effects,
//! damage formulas, events, scheduling) and exposes pure state-in/state-out
//! APIs. Character-specific behaviour plugs in through
//! [`handler::CombatHandler`]; the engine never names a character.
//!
//! A battle is a [`GameState`] driven by [`engine::run_simulation`] with an
//! injected [`rng::RandomSource`].
pub mod action;
pub mod combat;
pub mod config;
pub mod effect;
pub mod element;
pub mod energy;
pub mod engine;
pub mod error;
pub mod event;
pub mod handler;
pub mod rng;
pub mod state;
pub mod stats;

pub use action::{
    Ability, AbilityEffect, AbilitySet, Action, ActionKind, DamageSpec, EffectTarget, HitSpec,
    RotationConfig, RotationError, RotationStep, ShieldSpec, SupportSpec, TargetType,
    UltimatePolicy,
};
pub use config::CombatConfig;
pub use effect::{
    Aura, AuraTarget, Capability, DotDamage, DotKind, DurationType, Effect, EffectCategory,
    EffectHook, Stacking,
};
pub use element::{Element, ElementSet};
pub use engine::{
    ActionContext, CombatContext, Credit, DamageEntry, DamageOptions, ShiftMode, SimulationError,
    TurnError, dispatch, publish_event, run_simulation,
};
pub use error::{CombatError, ErrorSeverity};
pub use event::{DamageKind, Event, EventKind, EventPayload};
pub use handler::{CombatHandler, HandlerFactory, HandlerRegistry};
pub use rng::{PcgRng, RandomSource, ScriptedRng};
pub use state::{
    BattleOutcome, BattleResult, CharacterTotals, EffectId, Faction, GameState, LogDetail,
    LogEntry, LogKind, RegistryError, TurnOverride, Unit, UnitId, UnitRegistry,
};
pub use stats::{Modifier, ModifierOp, StackScaling, StatBlock, StatKey, Trace};
