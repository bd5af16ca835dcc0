//! Transient per-battle and per-action context.
//!
//! [`CombatContext`] carries what must not live in the canonical state: the
//! random source, the action currently being resolved (damage modifier
//! accumulator, pending log entry), the event nesting depth and the credit
//! guard.

use std::collections::BTreeSet;

use crate::action::ActionKind;
use crate::combat::DamageModifiers;
use crate::rng::RandomSource;
use crate::state::{LogEntry, UnitId};

/// A reward or trigger that may be granted at most once per action.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Credit {
    /// Kill energy for defeating the unit.
    KillReward(UnitId),
    WeaknessBreak(UnitId),
    /// Handler-defined one-time trigger (e.g. a stack gained from one target).
    OneTime { key: String, target: UnitId },
}

impl Credit {
    pub fn one_time(key: impl Into<String>, target: &UnitId) -> Self {
        Self::OneTime {
            key: key.into(),
            target: target.clone(),
        }
    }
}

/// The action being resolved.
#[derive(Clone, Debug)]
pub struct ActionContext {
    pub source: UnitId,
    pub kind: ActionKind,
    pub primary_target: Option<UnitId>,
    /// Reset before every hit.
    pub modifiers: DamageModifiers,
    /// Flushed to the battle log when the action completes.
    pub log: LogEntry,
    credited: BTreeSet<Credit>,
}

impl ActionContext {
    pub fn new(
        source: UnitId,
        kind: ActionKind,
        primary_target: Option<UnitId>,
        log: LogEntry,
    ) -> Self {
        Self {
            source,
            kind,
            primary_target,
            modifiers: DamageModifiers::default(),
            log,
            credited: BTreeSet::new(),
        }
    }
}

pub struct CombatContext<'r> {
    pub rng: &'r mut dyn RandomSource,
    action: Option<ActionContext>,
    depth: u32,
    credited: BTreeSet<Credit>,
}

impl<'r> CombatContext<'r> {
    pub fn new(rng: &'r mut dyn RandomSource) -> Self {
        Self {
            rng,
            action: None,
            depth: 0,
            credited: BTreeSet::new(),
        }
    }

    /// Starts resolving an action, returning the one it interrupts (if any).
    pub fn begin_action(&mut self, action: ActionContext) -> Option<ActionContext> {
        self.action.replace(action)
    }

    /// Finishes the current action and restores the interrupted one.
    pub fn end_action(&mut self, restore: Option<ActionContext>) -> Option<ActionContext> {
        std::mem::replace(&mut self.action, restore)
    }

    pub fn action(&self) -> Option<&ActionContext> {
        self.action.as_ref()
    }

    pub fn action_mut(&mut self) -> Option<&mut ActionContext> {
        self.action.as_mut()
    }

    pub fn action_kind(&self) -> Option<ActionKind> {
        self.action.as_ref().map(|action| action.kind)
    }

    /// Damage modifier accumulator of the current hit; `None` outside actions.
    pub fn modifiers_mut(&mut self) -> Option<&mut DamageModifiers> {
        self.action.as_mut().map(|action| &mut action.modifiers)
    }

    pub fn modifiers(&self) -> DamageModifiers {
        self.action
            .as_ref()
            .map(|action| action.modifiers)
            .unwrap_or_default()
    }

    pub fn reset_modifiers(&mut self) {
        if let Some(action) = self.action.as_mut() {
            action.modifiers = DamageModifiers::default();
        }
    }

    pub fn roll(&mut self, chance: f64) -> bool {
        self.rng.chance(chance)
    }

    /// Records `credit`; false when it was already granted in this action.
    ///
    /// Outside an action, credits are tracked until [`reset_credits`](Self::reset_credits).
    pub fn credit(&mut self, credit: Credit) -> bool {
        match self.action.as_mut() {
            Some(action) => action.credited.insert(credit),
            None => self.credited.insert(credit),
        }
    }

    /// Clears credits granted outside any action.
    pub fn reset_credits(&mut self) {
        self.credited.clear();
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub(crate) fn enter(&mut self) -> u32 {
        self.depth += 1;
        self.depth
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
