//! Named numeric counters carried by a unit.
//!
//! A counter is a permanent, modifier-free effect whose [`Effect::value`]
//! holds the running total. Kits use them for "damage taken so far" or
//! "HP consumed" style talents.

use tracing::trace;

use super::{Effect, EffectCategory};
use crate::state::{EffectId, GameState, UnitId};

/// How much of a counter [`consume`] takes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Consume {
    All,
    /// At most this amount.
    Fixed(f64),
    /// This fraction of the current total.
    Ratio(f64),
}

pub fn accumulator_id(owner: &UnitId, key: &str) -> EffectId {
    EffectId::new(format!("accumulator:{key}:{owner}"))
}

/// Current total of `key` on `owner`; zero when absent.
pub fn value(state: &GameState, owner: &UnitId, key: &str) -> f64 {
    state
        .unit(owner)
        .and_then(|unit| unit.effect(&accumulator_id(owner, key)))
        .map_or(0.0, |effect| effect.value)
}

/// Adds `amount` to `key`, clamped to `[0, cap]` when a cap is given.
pub fn accumulate(state: GameState, owner: &UnitId, key: &str, amount: f64, cap: Option<f64>) -> GameState {
    let total = value(&state, owner, key) + amount;
    let total = cap.map_or(total, |cap| total.min(cap)).max(0.0);
    trace!(target: "combat::effects", unit = %owner, key, total, "accumulate");
    store(state, owner, key, total)
}

/// Takes part of `key` away and returns the amount taken.
pub fn consume(state: GameState, owner: &UnitId, key: &str, how: Consume) -> (GameState, f64) {
    let current = value(&state, owner, key);
    let taken = match how {
        Consume::All => current,
        Consume::Fixed(amount) => amount.clamp(0.0, current),
        Consume::Ratio(ratio) => current * ratio.clamp(0.0, 1.0),
    };
    if taken <= 0.0 {
        return (state, 0.0);
    }
    (store(state, owner, key, current - taken), taken)
}

pub fn clear(state: GameState, owner: &UnitId, key: &str) -> GameState {
    super::remove_effect(state, owner, &accumulator_id(owner, key))
}

fn store(state: GameState, owner: &UnitId, key: &str, total: f64) -> GameState {
    let id = accumulator_id(owner, key);
    let exists = state.unit(owner).is_some_and(|unit| unit.has_effect(&id));
    if !exists {
        let counter = Effect::new(id, key, owner.clone(), EffectCategory::Other)
            .permanent()
            .with_value(total);
        return super::add_effect(state, owner, counter);
    }
    state.update_unit(owner, |mut unit| {
        if let Some(counter) = unit.effects.iter_mut().find(|effect| effect.id == id) {
            counter.value = total;
        }
        unit
    })
}
