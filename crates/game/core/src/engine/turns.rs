//! Action value timeline.
//!
//! Each unit's action value (AV) is the time left until its next turn:
//! `ACTION_GAUGE / spd` after acting. The unit with the lowest AV acts next;
//! ties go to registry order.

use tracing::trace;

use crate::config::CombatConfig;
use crate::state::{GameState, Unit, UnitId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("no living units are scheduled")]
    NoActiveUnits,
}

impl crate::error::CombatError for TurnError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoActiveUnits => "TURN_NO_ACTIVE_UNITS",
        }
    }
}

/// How an advance or delay amount is interpreted.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShiftMode {
    /// Fraction of the action gauge, converted to AV through the unit's speed.
    Percent,
    /// Raw action value.
    Flat,
}

/// Full action value for a unit with speed `spd`.
pub fn base_action_value(spd: f64) -> f64 {
    if spd > 0.0 {
        CombatConfig::ACTION_GAUGE / spd
    } else {
        f64::MAX
    }
}

/// Gives every unit a full action value.
pub fn initialize_action_values(state: GameState) -> GameState {
    GameState {
        registry: state.registry.update_all(|mut unit| {
            unit.action_value = base_action_value(unit.spd());
            unit
        }),
        ..state
    }
}

/// Resets `unit`'s action value to a full gauge at its current speed.
pub fn reset_action_value(state: GameState, unit: &UnitId) -> GameState {
    state.update_unit(unit, |mut unit| {
        unit.action_value = base_action_value(unit.spd());
        unit
    })
}

/// Next living unit to act and its action value.
pub fn select_next_actor(state: &GameState) -> Result<(UnitId, f64), TurnError> {
    state
        .registry
        .iter()
        .filter(|unit| unit.is_alive())
        .fold(None::<&Unit>, |best, unit| match best {
            Some(best) if best.action_value <= unit.action_value => Some(best),
            _ => Some(unit),
        })
        .map(|unit| (unit.id.clone(), unit.action_value))
        .ok_or(TurnError::NoActiveUnits)
}

/// Moves the timeline forward by `elapsed`.
pub fn advance_timeline(state: GameState, elapsed: f64) -> GameState {
    let elapsed = elapsed.max(0.0);
    trace!(target: "combat::turns", elapsed, time = state.time + elapsed, "advance timeline");
    GameState {
        time: state.time + elapsed,
        registry: state.registry.update_all(|mut unit| {
            if unit.is_alive() {
                unit.action_value = (unit.action_value - elapsed).max(0.0);
            }
            unit
        }),
        ..state
    }
}

/// Brings `unit`'s next turn closer; AV never drops below zero.
pub fn advance_action(state: GameState, unit: &UnitId, amount: f64, mode: ShiftMode) -> GameState {
    shift(state, unit, -amount, mode)
}

/// Pushes `unit`'s next turn back.
pub fn delay_action(state: GameState, unit: &UnitId, amount: f64, mode: ShiftMode) -> GameState {
    shift(state, unit, amount, mode)
}

fn shift(state: GameState, unit: &UnitId, amount: f64, mode: ShiftMode) -> GameState {
    state.update_unit(unit, |mut unit| {
        let delta = match mode {
            ShiftMode::Percent if unit.spd() > 0.0 => {
                CombatConfig::ACTION_GAUGE * amount / unit.spd()
            }
            ShiftMode::Percent => 0.0,
            ShiftMode::Flat => amount,
        };
        unit.action_value = (unit.action_value + delta).max(0.0);
        trace!(target: "combat::turns", unit = %unit.id, av = unit.action_value, "shift action");
        unit
    })
}

/// Keeps the remaining fraction of the gauge when speed changes:
/// `AV' = AV × old / new`.
pub fn rescale_on_speed_change(mut unit: Unit, old_spd: f64, new_spd: f64) -> Unit {
    if old_spd > 0.0 && new_spd > 0.0 && (old_spd - new_spd).abs() > f64::EPSILON {
        unit.action_value *= old_spd / new_spd;
    }
    unit
}
