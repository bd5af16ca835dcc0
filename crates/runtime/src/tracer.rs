//! Event tracing handler.

use combat_core::{CombatContext, CombatHandler, Event, EventKind, GameState};
use strum::IntoEnumIterator;
use tracing::trace;

pub const EVENT_TRACER_ID: &str = "runtime:event-tracer";

/// Logs every published event at `trace` level under `combat::events`.
///
/// Registered last so it observes events after the kits that react to them.
#[derive(Debug)]
pub struct EventTracer {
    events: Vec<EventKind>,
}

impl EventTracer {
    pub fn new() -> Self {
        Self {
            events: EventKind::iter().collect(),
        }
    }
}

impl Default for EventTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatHandler for EventTracer {
    fn id(&self) -> &str {
        EVENT_TRACER_ID
    }

    fn subscribed_events(&self) -> &[EventKind] {
        &self.events
    }

    fn handle(&self, event: &Event, state: GameState, _: &mut CombatContext<'_>) -> GameState {
        trace!(
            target: "combat::events",
            time = state.time,
            kind = %event.kind,
            source = %event.source,
            target_unit = event.target.as_ref().map(|t| t.as_str()),
            action = ?event.action,
            value = event.value,
            payload = ?event.payload,
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{CombatConfig, ScriptedRng, UnitId, UnitRegistry};
    use strum::EnumCount;

    #[test]
    fn subscribes_to_every_event_kind() {
        assert_eq!(EventTracer::new().subscribed_events().len(), EventKind::COUNT);
    }

    #[test]
    fn leaves_state_untouched() {
        let state = GameState::new(UnitRegistry::new(), CombatConfig::default());
        let before = state.clone();
        let mut rng = ScriptedRng::always();
        let mut ctx = CombatContext::new(&mut rng);
        let event = Event::new(EventKind::TurnStart, UnitId::new("yanqing"));

        let after = EventTracer::new().handle(&event, state, &mut ctx);
        assert_eq!(after.time, before.time);
        assert_eq!(after.log, before.log);
        assert_eq!(after.registry, before.registry);
    }
}
