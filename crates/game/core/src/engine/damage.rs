//! Applying numbers to the state: HP loss, toughness, breaks, healing,
//! shields and energy.
//!
//! [`apply_unified_damage`] is the single funnel for every HP loss. Nothing
//! else in the engine writes `Unit::hp` downwards.

use tracing::debug;

use super::context::{CombatContext, Credit};
use super::dispatcher::{grant_effect, publish_event};
use super::turns::{ShiftMode, delay_action};
use crate::action::{ActionKind, SupportSpec};
use crate::combat::{self, breaking::break_extra_delay, toughness::can_reduce_toughness};
use crate::config::CombatConfig;
use crate::effect::{self, Capability, library};
use crate::energy;
use crate::event::{DamageKind, Event, EventKind, EventPayload};
use crate::state::{GameState, LogDetail, LogEntry, LogKind, UnitId};
use crate::stats::StatKey;

/// How a damage instance is applied and reported.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageOptions {
    pub kind: DamageKind,
    pub is_crit: bool,
    pub label: String,
    /// Skip shields and hit HP directly.
    pub bypass_shield: bool,
    /// HP never drops below this floor.
    pub min_hp: Option<f64>,
    pub skip_log: bool,
    /// Do not credit the damage to the attacker's totals.
    pub skip_stats: bool,
    /// Leave `DamageDealt`/defeat events to the caller.
    pub defer_events: bool,
}

impl DamageOptions {
    pub fn new(kind: DamageKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            is_crit: false,
            label: label.into(),
            bypass_shield: false,
            min_hp: None,
            skip_log: false,
            skip_stats: false,
            defer_events: false,
        }
    }

    #[must_use]
    pub fn crit(mut self, is_crit: bool) -> Self {
        self.is_crit = is_crit;
        self
    }

    #[must_use]
    pub fn deferred(mut self) -> Self {
        self.defer_events = true;
        self
    }
}

/// What a damage instance actually did.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageEntry {
    pub attacker: UnitId,
    pub target: UnitId,
    pub kind: DamageKind,
    pub is_crit: bool,
    /// Damage before shields.
    pub amount: f64,
    pub shield_absorbed: f64,
    pub hp_lost: f64,
    pub previous_hp_ratio: f64,
    pub current_hp_ratio: f64,
    pub killed: bool,
}

impl DamageEntry {
    fn empty(attacker: &UnitId, target: &UnitId, options: &DamageOptions) -> Self {
        Self {
            attacker: attacker.clone(),
            target: target.clone(),
            kind: options.kind,
            is_crit: options.is_crit,
            amount: 0.0,
            shield_absorbed: 0.0,
            hp_lost: 0.0,
            previous_hp_ratio: 0.0,
            current_hp_ratio: 0.0,
            killed: false,
        }
    }

    fn payload(&self) -> EventPayload {
        EventPayload::Damage {
            damage_kind: self.kind,
            is_crit: self.is_crit,
            shield_absorbed: self.shield_absorbed,
            previous_hp_ratio: self.previous_hp_ratio,
            current_hp_ratio: self.current_hp_ratio,
            killed: self.killed,
        }
    }
}

/// Applies `amount` damage from `attacker` to `defender`.
///
/// Shields absorb first, HP is clamped to `[min_hp, max]`, effects that end
/// on HP loss are removed only when the HP ratio strictly decreased, and the
/// damage is logged and credited. Dead or unknown defenders take nothing.
pub fn apply_unified_damage(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    attacker: &UnitId,
    defender: &UnitId,
    amount: f64,
    options: DamageOptions,
) -> (GameState, DamageEntry) {
    let mut entry = DamageEntry::empty(attacker, defender, &options);
    let Some(target) = state.unit(defender).filter(|unit| unit.is_alive()) else {
        return (state, entry);
    };

    let amount = amount.max(0.0);
    let previous_hp_ratio = target.hp_ratio();
    let shield_absorbed = if options.bypass_shield {
        0.0
    } else {
        target.shield.min(amount)
    };
    let floor = options.min_hp.unwrap_or(0.0).min(target.hp);
    let new_hp = (target.hp - (amount - shield_absorbed)).clamp(floor, target.max_hp());
    let hp_lost = target.hp - new_hp;

    let mut state = state.update_unit(defender, |mut unit| {
        unit.shield -= shield_absorbed;
        unit.hp = new_hp;
        unit
    });
    let (current_hp_ratio, killed, defender_is_enemy) = state
        .unit(defender)
        .map(|unit| (unit.hp_ratio(), !unit.is_alive(), unit.is_enemy()))
        .unwrap_or((0.0, false, false));

    entry.amount = amount;
    entry.shield_absorbed = shield_absorbed;
    entry.hp_lost = hp_lost;
    entry.previous_hp_ratio = previous_hp_ratio;
    entry.current_hp_ratio = current_hp_ratio;
    entry.killed = killed;

    debug!(
        target: "combat::damage",
        attacker = %attacker,
        defender = %defender,
        kind = %options.kind,
        amount,
        shield_absorbed,
        hp_lost,
        killed,
        "damage"
    );

    if current_hp_ratio < previous_hp_ratio {
        state = effect::remove_effects_where(state, defender, |effect| {
            effect.has(Capability::REMOVED_ON_HP_LOSS)
        });
    }

    // Totals count the whole hit, overkill included; `hp_lost` holds what
    // the defender actually lost.
    let attacker_is_ally = state.unit(attacker).is_some_and(|unit| unit.is_ally());
    if !options.skip_stats && attacker_is_ally && defender_is_enemy {
        state.result.record_damage(attacker, amount);
    }

    if !options.skip_log {
        state = log_detail(
            state,
            ctx,
            attacker,
            LogKind::Damage(options.kind),
            LogDetail::Damage {
                target: defender.clone(),
                kind: options.kind,
                amount,
                is_crit: options.is_crit,
                label: options.label.clone(),
            },
        );
    }

    if !options.defer_events {
        state = publish_damage_events(state, ctx, &entry);
    }
    (state, entry)
}

/// Publishes `DamageDealt` and, on a kill, the defeat event and kill energy.
pub fn publish_damage_events(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    entry: &DamageEntry,
) -> GameState {
    let action = ctx.action_kind();
    let mut state = publish_event(
        state,
        ctx,
        Event::new(EventKind::DamageDealt, entry.attacker.clone())
            .with_target(entry.target.clone())
            .with_action(action)
            .with_value(entry.amount)
            .with_payload(entry.payload()),
    );
    if !entry.killed {
        return state;
    }

    let victim_is_enemy = state.unit(&entry.target).is_some_and(|unit| unit.is_enemy());
    let defeat = if victim_is_enemy {
        EventKind::EnemyDefeated
    } else {
        EventKind::UnitDefeated
    };
    debug!(target: "combat::damage", victim = %entry.target, by = %entry.attacker, "defeated");

    state = state.update_unit(&entry.target, |mut unit| {
        unit.action_value = f64::MAX;
        unit
    });
    state = effect::remove_auras_by_source(state, &entry.target);
    state = publish_event(
        state,
        ctx,
        Event::new(defeat, entry.attacker.clone())
            .with_target(entry.target.clone())
            .with_action(action)
            .with_payload(entry.payload()),
    );

    let killer_is_ally = state.unit(&entry.attacker).is_some_and(|unit| unit.is_ally());
    if victim_is_enemy && killer_is_ally && ctx.credit(Credit::KillReward(entry.target.clone())) {
        let reward = state.config.kill_energy_reward;
        state = add_energy(state, ctx, &entry.attacker, 0.0, reward);
    }
    state
}

/// Result of a toughness reduction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ToughnessOutcome {
    pub reduced: f64,
    /// Toughness reached zero with this hit.
    pub broke: bool,
}

/// Removes `amount` toughness when `defender` is weak to `attacker`'s element
/// and not already broken. Publishes nothing; see [`on_weakness_break`].
pub fn reduce_toughness(
    state: GameState,
    attacker: &UnitId,
    defender: &UnitId,
    amount: f64,
) -> (GameState, ToughnessOutcome) {
    let eligible = match (state.unit(attacker), state.unit(defender)) {
        (Some(a), Some(d)) => d.is_alive() && !d.is_broken() && can_reduce_toughness(a, d),
        _ => false,
    };
    if !eligible || amount <= 0.0 {
        return (state, ToughnessOutcome::default());
    }

    let mut outcome = ToughnessOutcome::default();
    let state = state.update_unit(defender, |mut unit| {
        let before = unit.toughness;
        unit.toughness = (unit.toughness - amount).clamp(0.0, unit.max_toughness);
        outcome.reduced = before - unit.toughness;
        outcome.broke = before > 0.0 && unit.toughness <= 0.0;
        unit
    });
    (state, outcome)
}

/// Publishes `WeaknessBreak` for `defender`, at most once per action.
pub fn on_weakness_break(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    attacker: &UnitId,
    defender: &UnitId,
) -> (GameState, bool) {
    if !ctx.credit(Credit::WeaknessBreak(defender.clone())) {
        return (state, false);
    }
    debug!(target: "combat::damage", attacker = %attacker, defender = %defender, "weakness break");
    let action = ctx.action_kind();
    let state = publish_event(
        state,
        ctx,
        Event::new(EventKind::WeaknessBreak, attacker.clone())
            .with_target(defender.clone())
            .with_action(action),
    );
    (state, true)
}

/// Break damage, action delay and the element's break status.
pub fn apply_break_effect(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    attacker: &UnitId,
    defender: &UnitId,
) -> GameState {
    let (Some(source), Some(target)) = (state.unit(attacker), state.unit(defender)) else {
        return state;
    };
    if !target.is_alive() {
        return state;
    }

    let (damage, _) = combat::calculate_break_damage_with_breakdown(source, target);
    let delay = CombatConfig::BREAK_DELAY
        + break_extra_delay(source.element, source.stat(StatKey::BreakEffect));
    let status = library::break_status(source, target);

    let (state, entry) = apply_unified_damage(
        state,
        ctx,
        attacker,
        defender,
        damage,
        DamageOptions::new(DamageKind::Break, "Weakness Break"),
    );
    if entry.killed {
        return state;
    }
    let state = delay_action(state, defender, delay, ShiftMode::Percent);
    grant_effect(state, ctx, defender, status)
}

/// Super break damage for a hit on an already broken enemy.
pub fn apply_super_break(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    attacker: &UnitId,
    defender: &UnitId,
    toughness_reduction: f64,
) -> GameState {
    let damage = match (state.unit(attacker), state.unit(defender)) {
        (Some(a), Some(d)) => combat::calculate_super_break_damage(a, d, toughness_reduction),
        _ => 0.0,
    };
    if damage <= 0.0 {
        return state;
    }
    apply_unified_damage(
        state,
        ctx,
        attacker,
        defender,
        damage,
        DamageOptions::new(DamageKind::SuperBreak, "Super Break"),
    )
    .0
}

/// Additional damage of `base` (crit-capable) from a passive.
pub fn deal_additional_damage(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    attacker: &UnitId,
    defender: &UnitId,
    base: f64,
    label: &str,
) -> GameState {
    let mods = ctx.modifiers();
    let outcome = match (state.unit(attacker), state.unit(defender)) {
        (Some(a), Some(d)) if d.is_alive() => {
            combat::calculate_additional_damage(a, d, base, &mods, &mut *ctx.rng)
        }
        _ => return state,
    };
    apply_unified_damage(
        state,
        ctx,
        attacker,
        defender,
        outcome.damage,
        DamageOptions::new(DamageKind::Additional, label).crit(outcome.is_crit),
    )
    .0
}

/// Spends HP without killing: the unit keeps at least 1 HP.
pub fn consume_hp(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    unit: &UnitId,
    amount: f64,
    label: &str,
) -> (GameState, DamageEntry) {
    let options = DamageOptions {
        bypass_shield: true,
        min_hp: Some(1.0),
        skip_stats: true,
        ..DamageOptions::new(DamageKind::HpCost, label)
    };
    apply_unified_damage(state, ctx, unit, unit, amount, options)
}

/// Heals `target` by the amount `spec` yields; overflow is discarded.
pub fn apply_healing(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    source: &UnitId,
    target: &UnitId,
    spec: &SupportSpec,
) -> GameState {
    let amount = match (state.unit(source), state.unit(target)) {
        (Some(s), Some(t)) if t.is_alive() => combat::calculate_healing(s, t, spec),
        _ => return state,
    };

    let mut healed = 0.0;
    let mut state = state.update_unit(target, |mut unit| {
        let before = unit.hp;
        unit.hp = (unit.hp + amount).min(unit.max_hp());
        healed = unit.hp - before;
        unit
    });
    state.result.record_healing(source, healed);

    let state = log_detail(
        state,
        ctx,
        source,
        LogKind::Action(ctx.action_kind().unwrap_or(ActionKind::Skill)),
        LogDetail::Heal {
            target: target.clone(),
            amount: healed,
            label: "Heal".into(),
        },
    );
    let action = ctx.action_kind();
    publish_event(
        state,
        ctx,
        Event::new(EventKind::UnitHealed, source.clone())
            .with_target(target.clone())
            .with_action(action)
            .with_value(healed),
    )
}

/// Shields `target` for `duration` of its turns.
pub fn apply_shield(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    source: &UnitId,
    target: &UnitId,
    spec: &SupportSpec,
    duration: i32,
) -> GameState {
    let amount = match (state.unit(source), state.unit(target)) {
        (Some(s), Some(t)) if t.is_alive() => combat::calculate_shield(s, spec),
        _ => return state,
    };

    let shield = library::shield(format!("shield:{source}"), source.clone(), amount, duration);
    let mut state = effect::add_effect(state, target, shield);
    state.result.record_shield(source, amount);

    let state = log_detail(
        state,
        ctx,
        source,
        LogKind::Action(ctx.action_kind().unwrap_or(ActionKind::Skill)),
        LogDetail::Shield {
            target: target.clone(),
            amount,
            label: "Shield".into(),
        },
    );
    let action = ctx.action_kind();
    publish_event(
        state,
        ctx,
        Event::new(EventKind::ShieldApplied, source.clone())
            .with_target(target.clone())
            .with_action(action)
            .with_value(amount),
    )
}

/// Refills `unit`'s toughness.
pub fn restore_toughness(state: GameState, unit: &UnitId) -> GameState {
    state.update_unit(unit, |mut unit| {
        unit.toughness = unit.max_toughness;
        unit
    })
}

/// Grants energy and publishes `EnergyFull` when it fills.
pub fn add_energy(
    state: GameState,
    ctx: &mut CombatContext<'_>,
    unit: &UnitId,
    base: f64,
    flat: f64,
) -> GameState {
    let mut became_full = false;
    let state = state.update_unit(unit, |u| {
        let gain = energy::gain_energy(u, base, flat);
        became_full = gain.became_full;
        gain.unit
    });
    if !became_full {
        return state;
    }
    publish_event(state, ctx, Event::new(EventKind::EnergyFull, unit.clone()))
}

/// Records a log detail into the current action, or as its own entry when
/// no action is being resolved.
pub fn log_detail(
    mut state: GameState,
    ctx: &mut CombatContext<'_>,
    actor: &UnitId,
    kind: LogKind,
    detail: LogDetail,
) -> GameState {
    if let Some(action) = ctx.action_mut() {
        action.log.push(detail);
        return state;
    }
    let target = match &detail {
        LogDetail::Damage { target, .. }
        | LogDetail::Heal { target, .. }
        | LogDetail::Shield { target, .. } => Some(target.clone()),
        LogDetail::Note(_) => None,
    };
    let mut entry = LogEntry::new(state.time, state.round(), actor.clone(), kind).with_target(target);
    entry.push(detail);
    state.log.push(entry);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;
    use crate::element::{Element, ElementSet};
    use crate::rng::ScriptedRng;
    use crate::state::{Unit, UnitRegistry};
    use crate::stats::Modifier;

    fn ally_id() -> UnitId {
        UnitId::new("yanqing")
    }

    fn enemy_id() -> UnitId {
        UnitId::new("e1")
    }

    fn state() -> GameState {
        let ally = Unit::character(ally_id(), "Yanqing", Element::Ice)
            .with_base_stat(StatKey::Hp, 1000.0)
            .with_base_stat(StatKey::Atk, 600.0)
            .with_base_stat(StatKey::MaxEp, 140.0)
            .ready();
        let enemy = Unit::enemy(enemy_id(), "Dummy", 80)
            .with_base_stat(StatKey::Hp, 1000.0)
            .with_weaknesses(ElementSet::from_iter([Element::Ice]))
            .with_toughness(30.0)
            .ready();
        GameState::new(
            UnitRegistry::from_units([ally, enemy]).unwrap(),
            CombatConfig::default(),
        )
    }

    fn soulsteel() -> Effect {
        Effect::buff("soulsteel", "Soulsteel Sync", ally_id())
            .permanent()
            .with_tags(Capability::REMOVED_ON_HP_LOSS)
    }

    #[test]
    fn hp_loss_removes_fragile_buffs() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = effect::add_effect(state(), &ally_id(), soulsteel());

        let (state, entry) = apply_unified_damage(
            state,
            &mut ctx,
            &enemy_id(),
            &ally_id(),
            100.0,
            DamageOptions::new(DamageKind::Direct, "hit"),
        );
        assert!(entry.current_hp_ratio < entry.previous_hp_ratio);
        assert!(state.unit(&ally_id()).unwrap().effects.is_empty());
    }

    #[test]
    fn fully_shielded_hit_keeps_fragile_buffs() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let state = effect::add_effect(state(), &ally_id(), soulsteel());
        let state = state.update_unit(&ally_id(), |mut unit| {
            unit.shield = 500.0;
            unit
        });

        let (state, entry) = apply_unified_damage(
            state,
            &mut ctx,
            &enemy_id(),
            &ally_id(),
            100.0,
            DamageOptions::new(DamageKind::Direct, "hit"),
        );
        assert_eq!(entry.shield_absorbed, 100.0);
        assert_eq!(entry.current_hp_ratio, entry.previous_hp_ratio);
        let ally = state.unit(&ally_id()).unwrap();
        assert_eq!(ally.effects.len(), 1);
        assert_eq!(ally.shield, 400.0);
    }

    #[test]
    fn kill_energy_is_credited_once_per_action() {
        use crate::engine::context::ActionContext;

        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let log = LogEntry::new(0.0, 1, ally_id(), LogKind::Action(ActionKind::Skill));
        ctx.begin_action(ActionContext::new(ally_id(), ActionKind::Skill, None, log));

        let state = state();
        let ep_before = state.unit(&ally_id()).unwrap().ep;
        let (state, entry) = apply_unified_damage(
            state,
            &mut ctx,
            &ally_id(),
            &enemy_id(),
            5000.0,
            DamageOptions::new(DamageKind::Direct, "hit"),
        );
        assert!(entry.killed);
        // A second instance on a dead enemy does nothing.
        let (state, second) = apply_unified_damage(
            state,
            &mut ctx,
            &ally_id(),
            &enemy_id(),
            5000.0,
            DamageOptions::new(DamageKind::Direct, "hit"),
        );
        assert!(!second.killed);

        let ally = state.unit(&ally_id()).unwrap();
        assert_eq!(ally.ep - ep_before, CombatConfig::DEFAULT_KILL_ENERGY_REWARD);
        assert_eq!(state.result.total_damage_dealt, 5000.0);
    }

    #[test]
    fn overkill_is_credited_in_full() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let (state, entry) = apply_unified_damage(
            state(),
            &mut ctx,
            &ally_id(),
            &enemy_id(),
            2500.0,
            DamageOptions::new(DamageKind::Direct, "hit"),
        );

        // 1000 HP enemy: 1500 of the hit is overkill.
        assert!(entry.killed);
        assert_eq!(entry.hp_lost, 1000.0);
        assert_eq!(entry.amount, 2500.0);
        assert_eq!(state.result.total_damage_dealt, 2500.0);
        assert_eq!(state.result.totals(&ally_id()).unwrap().damage_dealt, 2500.0);
        assert_eq!(state.log[0].total_damage, 2500.0);
    }

    #[test]
    fn defeated_units_drop_their_auras() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let dread = effect::Aura::new("dread", "Dread", enemy_id(), effect::AuraTarget::AllEnemies)
            .with_modifier(Modifier::add(StatKey::Atk, -100.0));
        let state = effect::add_aura(state(), dread);
        assert_eq!(state.unit(&ally_id()).unwrap().stat(StatKey::Atk), 500.0);

        let (state, _) = apply_unified_damage(
            state,
            &mut ctx,
            &ally_id(),
            &enemy_id(),
            5000.0,
            DamageOptions::new(DamageKind::Direct, "hit"),
        );

        assert!(state.auras.is_empty());
        assert_eq!(state.unit(&ally_id()).unwrap().stat(StatKey::Atk), 600.0);
    }

    #[test]
    fn toughness_breaks_once_and_clamps() {
        let (state, first) = reduce_toughness(state(), &ally_id(), &enemy_id(), 20.0);
        assert_eq!(first, ToughnessOutcome { reduced: 20.0, broke: false });

        let (state, second) = reduce_toughness(state, &ally_id(), &enemy_id(), 20.0);
        assert_eq!(second, ToughnessOutcome { reduced: 10.0, broke: true });
        assert_eq!(state.unit(&enemy_id()).unwrap().toughness, 0.0);

        let (state, third) = reduce_toughness(state, &ally_id(), &enemy_id(), 20.0);
        assert!(!third.broke);

        let state = restore_toughness(state, &enemy_id());
        assert_eq!(state.unit(&enemy_id()).unwrap().toughness, 30.0);
    }

    #[test]
    fn consume_hp_never_kills() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let (state, entry) = consume_hp(state(), &mut ctx, &ally_id(), 5000.0, "cost");
        assert!(!entry.killed);
        assert_eq!(state.unit(&ally_id()).unwrap().hp, 1.0);
        assert_eq!(state.result.total_damage_dealt, 0.0);
    }

    #[test]
    fn damage_outside_actions_is_logged_directly() {
        let mut rng = ScriptedRng::never();
        let mut ctx = CombatContext::new(&mut rng);
        let (state, _) = apply_unified_damage(
            state(),
            &mut ctx,
            &ally_id(),
            &enemy_id(),
            10.0,
            DamageOptions::new(DamageKind::Dot, "Burn"),
        );
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.log[0].kind, LogKind::Damage(DamageKind::Dot));
    }
}
