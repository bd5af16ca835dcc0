//! Direct, additional and DoT damage.

use super::{DamageModifiers, broken_multiplier, def_multiplier, res_multiplier, vuln_multiplier};
use crate::action::ActionKind;
use crate::rng::RandomSource;
use crate::state::Unit;
use crate::stats::StatKey;

/// Every factor that went into a damage number.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageBreakdown {
    pub base: f64,
    pub dmg_boost: f64,
    pub crit: f64,
    pub def: f64,
    pub res: f64,
    pub vuln: f64,
    pub broken: f64,
    /// Defender's DEF stat; reported only, defence is level-based.
    pub defender_def: f64,
}

impl DamageBreakdown {
    pub fn total(&self) -> f64 {
        self.base * self.dmg_boost * self.crit * self.def * self.res * self.vuln * self.broken
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageOutcome {
    pub damage: f64,
    pub is_crit: bool,
    pub breakdown: DamageBreakdown,
}

/// Damage of one hit.
///
/// # Formula
///
/// ```text
/// base      = stat[scaling] × multiplier
/// dmg_boost = 1 + elem + type(action) + all − all_dmg_dealt_reduction + mods
/// crit      = 1 + crit_dmg     with probability clamp(crit_rate, 0, 1)
/// damage    = base × dmg_boost × crit × def × res × vuln × broken
/// ```
///
/// The crit roll consumes a random value only when the chance is strictly
/// between 0 and 1.
pub fn calculate_damage_with_crit_info(
    attacker: &Unit,
    defender: &Unit,
    scaling: StatKey,
    multiplier: f64,
    action: Option<ActionKind>,
    mods: &DamageModifiers,
    rng: &mut dyn RandomSource,
) -> DamageOutcome {
    let base = attacker.stat(scaling) * multiplier;
    let type_boost = action.map_or(0.0, |kind| attacker.stat(kind.dmg_boost_stat()));
    let dmg_boost = 1.0
        + attacker.stat(attacker.element.dmg_boost_stat())
        + type_boost
        + attacker.stat(StatKey::AllTypeDmgBoost)
        - attacker.stat(StatKey::AllDmgDealtReduction)
        + mods.dmg_boost;

    let (is_crit, crit) = roll_crit(attacker, mods, rng);
    let breakdown = DamageBreakdown {
        base,
        dmg_boost,
        crit,
        def: def_multiplier(attacker, defender, mods.def_ignore),
        res: res_multiplier(attacker, defender, mods.res_pen),
        vuln: vuln_multiplier(attacker, defender, mods.vuln),
        broken: broken_multiplier(defender),
        defender_def: defender.stat(StatKey::Def),
    };

    DamageOutcome {
        damage: breakdown.total().max(0.0),
        is_crit,
        breakdown,
    }
}

/// Additional damage triggered by a passive: crits and uses generic boosts.
pub fn calculate_additional_damage(
    attacker: &Unit,
    defender: &Unit,
    base: f64,
    mods: &DamageModifiers,
    rng: &mut dyn RandomSource,
) -> DamageOutcome {
    let dmg_boost = 1.0
        + attacker.stat(attacker.element.dmg_boost_stat())
        + attacker.stat(StatKey::AllTypeDmgBoost)
        + mods.dmg_boost;
    let (is_crit, crit) = roll_crit(attacker, mods, rng);
    let breakdown = DamageBreakdown {
        base,
        dmg_boost,
        crit,
        def: def_multiplier(attacker, defender, mods.def_ignore),
        res: res_multiplier(attacker, defender, mods.res_pen),
        vuln: vuln_multiplier(attacker, defender, mods.vuln),
        broken: broken_multiplier(defender),
        defender_def: defender.stat(StatKey::Def),
    };
    DamageOutcome {
        damage: breakdown.total().max(0.0),
        is_crit,
        breakdown,
    }
}

/// Character DoT tick: `stat × multiplier`, boosted by elemental, all-type
/// and DoT boosts. DoTs never crit.
pub fn calculate_dot_damage(
    attacker: &Unit,
    defender: &Unit,
    scaling: StatKey,
    multiplier: f64,
) -> f64 {
    let base = attacker.stat(scaling) * multiplier;
    let dmg_boost = 1.0
        + attacker.stat(attacker.element.dmg_boost_stat())
        + attacker.stat(StatKey::AllTypeDmgBoost)
        + attacker.stat(StatKey::DotDmgBoost);

    base * dmg_boost
        * def_multiplier(attacker, defender, 0.0)
        * res_multiplier(attacker, defender, 0.0)
        * vuln_multiplier(attacker, defender, 0.0)
        * broken_multiplier(defender)
}

fn roll_crit(attacker: &Unit, mods: &DamageModifiers, rng: &mut dyn RandomSource) -> (bool, f64) {
    let rate = (attacker.stat(StatKey::CritRate) + mods.crit_rate).clamp(0.0, 1.0);
    if rng.chance(rate) {
        (
            true,
            1.0 + attacker.stat(StatKey::CritDmg) + mods.crit_dmg,
        )
    } else {
        (false, 1.0)
    }
}
