//! Character handler contract.
//!
//! Every piece of character-specific behaviour (conditional buffs, follow-up
//! attacks, stacking counters, RNG-gated procs) lives behind
//! [`CombatHandler`]. The engine only knows the generic event vocabulary.

use std::fmt;
use std::sync::Arc;

use crate::engine::CombatContext;
use crate::event::{Event, EventKind};
use crate::state::{GameState, UnitId};

/// Reacts to published events.
///
/// Handlers are invoked in registration order for every event kind they
/// subscribe to. Randomness must come from `ctx`, never from ambient sources.
pub trait CombatHandler: Send + Sync {
    /// Stable identity; registering a handler with an existing id replaces it.
    fn id(&self) -> &str;

    fn subscribed_events(&self) -> &[EventKind];

    fn handle(&self, event: &Event, state: GameState, ctx: &mut CombatContext<'_>) -> GameState;
}

/// Builds a handler for the unit `id` at the given level and eidolon.
pub type HandlerFactory = fn(id: &UnitId, level: u32, eidolon: u8) -> Arc<dyn CombatHandler>;

/// Ordered handler list.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn CombatHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler`, or replaces an existing handler with the same id in place.
    pub fn register(&mut self, handler: Arc<dyn CombatHandler>) {
        match self.handlers.iter().position(|h| h.id() == handler.id()) {
            Some(index) => self.handlers[index] = handler,
            None => self.handlers.push(handler),
        }
    }

    pub fn unregister(&mut self, id: &str) {
        self.handlers.retain(|h| h.id() != id);
    }

    /// Handlers subscribed to `kind`, in registration order.
    pub fn subscribers(&self, kind: EventKind) -> Vec<Arc<dyn CombatHandler>> {
        self.handlers
            .iter()
            .filter(|h| h.subscribed_events().contains(&kind))
            .cloned()
            .collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, &'static [EventKind]);

    impl CombatHandler for Named {
        fn id(&self) -> &str {
            self.0
        }

        fn subscribed_events(&self) -> &[EventKind] {
            self.1
        }

        fn handle(&self, _: &Event, state: GameState, _: &mut CombatContext<'_>) -> GameState {
            state
        }
    }

    #[test]
    fn register_replaces_same_id_in_place() {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(Named("a", &[EventKind::TurnStart])));
        registry.register(Arc::new(Named("b", &[EventKind::TurnStart])));
        registry.register(Arc::new(Named("a", &[EventKind::TurnEnd])));

        assert_eq!(registry.ids(), vec!["a", "b"]);
        let turn_start: Vec<_> = registry
            .subscribers(EventKind::TurnStart)
            .iter()
            .map(|h| h.id().to_owned())
            .collect();
        assert_eq!(turn_start, vec!["b"]);
    }
}
