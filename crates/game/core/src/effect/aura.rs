//! Field-wide stat auras.
//!
//! An [`Aura`] lives on the [`GameState`] rather than on a unit: its modifiers
//! apply to every unit its [`AuraTarget`] selects for as long as the source is
//! alive. Each unit keeps the folded modifiers in [`Unit::auras`], rebuilt by
//! [`refresh_auras`] after every change.

use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::element::Element;
use crate::state::{EffectId, GameState, Unit, UnitId};
use crate::stats::{self, Modifier};

/// Units an aura applies to, relative to its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AuraTarget {
    SelfOnly,
    AllAllies,
    OtherAllies,
    AllEnemies,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aura {
    pub id: EffectId,
    pub name: String,
    pub source: UnitId,
    pub target: AuraTarget,
    /// Restricts the aura to units of this element.
    pub element: Option<Element>,
    pub modifiers: Vec<Modifier>,
}

impl Aura {
    pub fn new(
        id: impl Into<EffectId>,
        name: impl Into<String>,
        source: UnitId,
        target: AuraTarget,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source,
            target,
            element: None,
            modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn for_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    /// Whether `unit` receives this aura from `source`.
    pub fn covers(&self, source: &Unit, unit: &Unit) -> bool {
        let same_side = source.faction == unit.faction;
        let selected = match self.target {
            AuraTarget::SelfOnly => source.id == unit.id,
            AuraTarget::AllAllies => same_side,
            AuraTarget::OtherAllies => same_side && source.id != unit.id,
            AuraTarget::AllEnemies => !same_side,
        };
        selected && self.element.is_none_or(|element| element == unit.element)
    }
}

/// Adds `aura`, replacing any aura with the same id.
pub fn add_aura(mut state: GameState, aura: Aura) -> GameState {
    debug!(target: "combat::effects", aura = %aura.id, source = %aura.source, target = %aura.target, "add aura");
    match state.auras.iter().position(|existing| existing.id == aura.id) {
        Some(index) => state.auras[index] = aura,
        None => state.auras.push(aura),
    }
    refresh_auras(state)
}

pub fn remove_aura(mut state: GameState, id: &EffectId) -> GameState {
    let before = state.auras.len();
    state.auras.retain(|aura| &aura.id != id);
    if state.auras.len() == before {
        return state;
    }
    debug!(target: "combat::effects", aura = %id, "remove aura");
    refresh_auras(state)
}

/// Drops every aura `source` projects.
pub fn remove_auras_by_source(mut state: GameState, source: &UnitId) -> GameState {
    let before = state.auras.len();
    state.auras.retain(|aura| &aura.source != source);
    if state.auras.len() == before {
        return state;
    }
    debug!(target: "combat::effects", source = %source, "remove auras by source");
    refresh_auras(state)
}

/// Modifiers `unit` currently receives. Auras of dead sources contribute nothing.
pub fn aura_modifiers_for(state: &GameState, unit: &Unit) -> Vec<Modifier> {
    state
        .auras
        .iter()
        .filter_map(|aura| {
            let source = state.unit(&aura.source).filter(|source| source.is_alive())?;
            aura.covers(source, unit).then_some(&aura.modifiers)
        })
        .flatten()
        .cloned()
        .collect()
}

/// Rebuilds every unit's aura layer and recalculates the units it changed.
pub fn refresh_auras(state: GameState) -> GameState {
    let layers: Vec<(UnitId, Vec<Modifier>)> = state
        .registry
        .iter()
        .map(|unit| (unit.id.clone(), aura_modifiers_for(&state, unit)))
        .collect();

    layers.into_iter().fold(state, |state, (id, layer)| {
        state.update_unit(&id, |mut unit| {
            if unit.auras == layer {
                return unit;
            }
            unit.auras = layer;
            stats::recalculate(unit)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::state::UnitRegistry;
    use crate::stats::StatKey;

    fn ally(id: &str, element: Element) -> Unit {
        Unit::character(UnitId::new(id), id, element)
            .with_base_stat(StatKey::Hp, 1000.0)
            .with_base_stat(StatKey::Atk, 500.0)
            .ready()
    }

    fn enemy(id: &str) -> Unit {
        Unit::enemy(UnitId::new(id), id, 80)
            .with_base_stat(StatKey::Hp, 1000.0)
            .ready()
    }

    fn state() -> GameState {
        GameState::new(
            UnitRegistry::from_units([
                ally("a", Element::Fire),
                ally("b", Element::Fire),
                ally("c", Element::Ice),
                enemy("e"),
            ])
            .unwrap(),
            CombatConfig::default(),
        )
    }

    fn atk(state: &GameState, id: &str) -> f64 {
        state.unit(&UnitId::new(id)).unwrap().stat(StatKey::Atk)
    }

    fn banner(target: AuraTarget) -> Aura {
        Aura::new("banner", "Banner", UnitId::new("a"), target)
            .with_modifier(Modifier::multiply(StatKey::Atk, 0.2))
    }

    #[test]
    fn targets_are_resolved_from_the_source() {
        let all = add_aura(state(), banner(AuraTarget::AllAllies));
        assert!((atk(&all, "a") - 600.0).abs() < 1e-9);
        assert!((atk(&all, "c") - 600.0).abs() < 1e-9);
        assert!(all.unit(&UnitId::new("e")).unwrap().auras.is_empty());

        let others = add_aura(state(), banner(AuraTarget::OtherAllies));
        assert!((atk(&others, "a") - 500.0).abs() < 1e-9);
        assert!((atk(&others, "b") - 600.0).abs() < 1e-9);

        let foes = add_aura(state(), banner(AuraTarget::AllEnemies));
        assert!((atk(&foes, "a") - 500.0).abs() < 1e-9);
        assert_eq!(foes.unit(&UnitId::new("e")).unwrap().auras.len(), 1);
    }

    #[test]
    fn element_filter_limits_receivers() {
        let state = add_aura(state(), banner(AuraTarget::AllAllies).for_element(Element::Fire));
        assert!((atk(&state, "b") - 600.0).abs() < 1e-9);
        assert!((atk(&state, "c") - 500.0).abs() < 1e-9);
    }

    #[test]
    fn same_id_replaces_instead_of_stacking() {
        let state = add_aura(state(), banner(AuraTarget::SelfOnly));
        let state = add_aura(state, banner(AuraTarget::SelfOnly));
        assert_eq!(state.auras.len(), 1);
        assert!((atk(&state, "a") - 600.0).abs() < 1e-9);
    }

    #[test]
    fn removal_restores_stats() {
        let state = add_aura(state(), banner(AuraTarget::AllAllies));
        let state = remove_aura(state, &EffectId::new("banner"));
        assert!(state.auras.is_empty());
        assert!((atk(&state, "b") - 500.0).abs() < 1e-9);
    }

    #[test]
    fn dead_source_stops_contributing() {
        let state = add_aura(state(), banner(AuraTarget::AllAllies)).update_unit(&UnitId::new("a"), |mut unit| {
            unit.hp = 0.0;
            unit
        });
        assert!(aura_modifiers_for(&state, state.unit(&UnitId::new("b")).unwrap()).is_empty());

        let state = remove_auras_by_source(state, &UnitId::new("a"));
        assert!(state.auras.is_empty());
        assert!((atk(&state, "b") - 500.0).abs() < 1e-9);
    }
}
