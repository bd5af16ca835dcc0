//! Effects the engine applies on its own: weakness-break statuses and shields.

use super::{Capability, DotDamage, DotKind, Effect, EffectHook};
use crate::combat::breaking::{is_elite, level_multiplier, toughness_multiplier};
use crate::element::Element;
use crate::state::{EffectId, Unit, UnitId};
use crate::stats::{Modifier, StatKey};

const BLEED_HP_FRACTION: f64 = 0.16;
const BLEED_HP_FRACTION_ELITE: f64 = 0.07;
const WIND_SHEAR_MAX_STACKS: u32 = 5;
const WIND_SHEAR_ELITE_STACKS: u32 = 3;
const ENTANGLEMENT_MAX_STACKS: u32 = 5;
const IMPRISONMENT_SPD_REDUCTION: f64 = -0.10;
const BREAK_DOT_TURNS: i32 = 2;
const CROWD_CONTROL_TURNS: i32 = 1;

/// Effect id of the break status `kind` applied by `source`.
pub fn break_status_id(kind: DotKind, source: &UnitId) -> EffectId {
    match kind {
        // Crowd control is unique per target regardless of who applied it.
        DotKind::Frozen => EffectId::new("break_freeze"),
        DotKind::Entanglement => EffectId::new("break_entanglement"),
        _ => EffectId::new(format!("break_{kind}:{source}")),
    }
}

pub fn imprisonment_id() -> EffectId {
    EffectId::new("break_imprisonment")
}

/// Status applied to `target` when `attacker` breaks its weakness.
pub fn break_status(attacker: &Unit, target: &Unit) -> Effect {
    let lm = level_multiplier(attacker.level);
    let tm = toughness_multiplier(target.max_toughness);
    let elite = is_elite(target);
    let source = attacker.id.clone();

    let dot = |kind: DotKind, name: &str, base: f64| {
        Effect::debuff(break_status_id(kind, &source), name, source.clone())
            .turn_start_based(BREAK_DOT_TURNS)
            .with_tags(Capability::DOT | Capability::BREAK_STATUS | Capability::CLEANSABLE)
            .with_dot(kind, DotDamage::Break { base })
    };

    match attacker.element {
        Element::Physical => {
            let fraction = if elite {
                BLEED_HP_FRACTION_ELITE
            } else {
                BLEED_HP_FRACTION
            };
            let base = (target.max_hp() * fraction).min(2.0 * lm * tm);
            dot(DotKind::Bleed, "Bleed", base)
        }
        Element::Fire => dot(DotKind::Burn, "Burn", lm),
        Element::Lightning => dot(DotKind::Shock, "Shock", 2.0 * lm),
        Element::Wind => {
            let stacks = if elite { WIND_SHEAR_ELITE_STACKS } else { 1 };
            dot(DotKind::WindShear, "Wind Shear", lm).with_stacks(stacks, WIND_SHEAR_MAX_STACKS)
        }
        Element::Ice => {
            Effect::debuff(break_status_id(DotKind::Frozen, &source), "Frozen", source.clone())
                .turn_start_based(CROWD_CONTROL_TURNS)
                .with_tags(Capability::FREEZE | Capability::BREAK_STATUS | Capability::CLEANSABLE)
                .with_dot(DotKind::Frozen, DotDamage::Break { base: lm })
        }
        Element::Quantum => Effect::debuff(
            break_status_id(DotKind::Entanglement, &source),
            "Entanglement",
            source.clone(),
        )
        .turn_start_based(CROWD_CONTROL_TURNS)
        .with_tags(Capability::ENTANGLEMENT | Capability::BREAK_STATUS | Capability::CLEANSABLE)
        .with_stacks(1, ENTANGLEMENT_MAX_STACKS)
        .with_dot(
            DotKind::Entanglement,
            DotDamage::Break {
                base: 0.6 * lm * tm,
            },
        ),
        Element::Imaginary => Effect::debuff(imprisonment_id(), "Imprisonment", source.clone())
            .turn_start_based(CROWD_CONTROL_TURNS)
            .with_tags(Capability::IMPRISONMENT | Capability::BREAK_STATUS | Capability::CLEANSABLE)
            .with_modifier(
                Modifier::multiply(StatKey::Spd, IMPRISONMENT_SPD_REDUCTION)
                    .with_source("Imprisonment"),
            ),
    }
}

/// Shield effect granting `amount` to its owner for `turns` of the owner's turns.
pub fn shield(id: impl Into<EffectId>, source: UnitId, amount: f64, turns: i32) -> Effect {
    Effect::buff(id, "Shield", source)
        .turn_end_based(turns)
        .with_tags(Capability::SHIELD | Capability::DISPELLABLE)
        .with_hook(EffectHook::shield(amount))
}
