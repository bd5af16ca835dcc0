//! Authoritative battle state.
//!
//! [`GameState`] is threaded by value through every engine operation: each
//! call consumes a snapshot and returns the next one. Holding on to a clone
//! gives an independent snapshot; nothing in the engine mutates a state it
//! does not own.
pub mod ids;
pub mod registry;
pub mod result;
pub mod unit;

pub use ids::{EffectId, UnitId};
pub use registry::{RegistryError, UnitRegistry};
pub use result::{
    BattleOutcome, BattleResult, CharacterTotals, LogDetail, LogEntry, LogKind,
};
#[cfg(feature = "serde")]
pub use result::compute_log_root;
pub use unit::{Faction, Unit};

use crate::action::Action;
use crate::config::CombatConfig;
use crate::effect::Aura;
use crate::handler::{CombatHandler, HandlerRegistry};

/// Grants `unit` extra actions before its turn ends.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnOverride {
    pub unit: UnitId,
    pub extra_actions: u32,
}

/// Canonical snapshot of a battle.
#[derive(Clone, Debug)]
pub struct GameState {
    pub registry: UnitRegistry,
    pub handlers: HandlerRegistry,
    pub config: CombatConfig,
    /// Field auras in the order they were added.
    pub auras: Vec<Aura>,

    pub skill_points: u32,
    pub max_skill_points: u32,

    /// Follow-up actions queued by handlers, drained after the current action.
    pub pending_actions: Vec<Action>,
    pub turn_override: Option<TurnOverride>,
    /// Unit whose turn is in progress.
    pub current_actor: Option<UnitId>,

    /// Elapsed action value since battle start.
    pub time: f64,
    pub turn_count: u32,

    pub log: Vec<LogEntry>,
    pub result: BattleResult,
}

impl GameState {
    pub fn new(registry: UnitRegistry, config: CombatConfig) -> Self {
        Self {
            registry,
            handlers: HandlerRegistry::new(),
            auras: Vec::new(),
            skill_points: config.initial_skill_points,
            max_skill_points: config.max_skill_points,
            config,
            pending_actions: Vec::new(),
            turn_override: None,
            current_actor: None,
            time: 0.0,
            turn_count: 0,
            log: Vec::new(),
            result: BattleResult::default(),
        }
    }

    /// Registers a handler after the existing ones.
    #[must_use]
    pub fn with_handler(mut self, handler: std::sync::Arc<dyn CombatHandler>) -> Self {
        self.handlers.register(handler);
        self
    }

    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.registry.get(id)
    }

    /// Applies `f` to unit `id`; unknown ids leave the state unchanged.
    #[must_use]
    pub fn update_unit(mut self, id: &UnitId, f: impl FnOnce(Unit) -> Unit) -> Self {
        self.registry = self.registry.update(id, f);
        self
    }

    /// Current round, 1-based.
    pub fn round(&self) -> u32 {
        self.config.round_at(self.time)
    }

    /// Adds skill points, capped at the maximum.
    #[must_use]
    pub fn gain_skill_points(mut self, amount: u32) -> Self {
        self.skill_points = (self.skill_points + amount).min(self.max_skill_points);
        self
    }

    /// Queues a follow-up action.
    #[must_use]
    pub fn enqueue_action(mut self, action: Action) -> Self {
        self.pending_actions.push(action);
        self
    }

    pub fn push_log(mut self, entry: LogEntry) -> Self {
        self.log.push(entry);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_points_are_capped() {
        let state = GameState::new(UnitRegistry::new(), CombatConfig::default());
        assert_eq!(state.skill_points, CombatConfig::DEFAULT_INITIAL_SKILL_POINTS);

        let state = state.gain_skill_points(10);
        assert_eq!(state.skill_points, CombatConfig::DEFAULT_MAX_SKILL_POINTS);
    }

    #[test]
    fn first_round_is_longer() {
        let mut state = GameState::new(UnitRegistry::new(), CombatConfig::default());
        assert_eq!(state.round(), 1);
        state.time = 150.0;
        assert_eq!(state.round(), 1);
        state.time = 150.1;
        assert_eq!(state.round(), 2);
        state.time = 351.0;
        assert_eq!(state.round(), 4);
    }
}
