//! Event dispatch, action resolution, scheduling and the battle loop.
//!
//! Every entry point takes the [`GameState`](crate::state::GameState) by value
//! together with a [`CombatContext`] that carries the random source and the
//! action being resolved, and returns the next state.
//!
//! # Module Structure
//!
//! - `context`: transient per-action data (damage modifiers, log, credits)
//! - `dispatcher`: handler fan-out and the per-hit action pipeline
//! - `damage`: applying damage, toughness, breaks, healing, shields, energy
//! - `turns`: action value timeline
//! - `simulation`: turn flow, follow-ups, ultimates and outcome

pub mod context;
pub mod damage;
pub mod dispatcher;
mod errors;
pub mod simulation;
pub mod turns;

pub use context::{ActionContext, CombatContext, Credit};
pub use damage::{
    DamageEntry, DamageOptions, ToughnessOutcome, add_energy, apply_break_effect, apply_healing,
    apply_shield, apply_super_break, apply_unified_damage, consume_hp, deal_additional_damage,
    log_detail, on_weakness_break, publish_damage_events, reduce_toughness, restore_toughness,
};
pub use dispatcher::{dispatch, grant_effect, publish_event, revoke_effect};
pub use errors::SimulationError;
pub use simulation::{
    FREEZE_REMOVAL_ADVANCE, battle_outcome, determine_action, drain_pending,
    immediate_ultimates, run_simulation, run_turn, start_battle,
};
pub use turns::{
    ShiftMode, TurnError, advance_action, advance_timeline, base_action_value, delay_action,
    initialize_action_values, reset_action_value, rescale_on_speed_change, select_next_actor,
};
