//! Scenario runner.

use std::sync::Arc;

use combat_content::{KitCatalog, LightConeCatalog, Scenario};
use combat_core::{GameState, PcgRng, run_simulation};
use tracing::info;

use crate::assembly::assemble;
use crate::error::Result;
use crate::report::SimulationReport;
use crate::tracer::EventTracer;

/// Assembles and runs scenarios against kit and light cone catalogs.
///
/// Seed and round overrides take precedence over the scenario's own options.
#[derive(Clone)]
pub struct Runner {
    catalog: KitCatalog,
    light_cones: LightConeCatalog,
    seed: Option<u64>,
    rounds: Option<u32>,
    trace_events: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(KitCatalog::standard())
    }
}

impl Runner {
    pub fn new(catalog: KitCatalog) -> Self {
        Self {
            catalog,
            light_cones: LightConeCatalog::standard(),
            seed: None,
            rounds: None,
            trace_events: false,
        }
    }

    #[must_use]
    pub fn with_light_cones(mut self, light_cones: LightConeCatalog) -> Self {
        self.light_cones = light_cones;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_rounds(mut self, rounds: Option<u32>) -> Self {
        self.rounds = rounds;
        self
    }

    /// Registers an [`EventTracer`] after the party's handlers.
    #[must_use]
    pub fn with_event_trace(mut self, enabled: bool) -> Self {
        self.trace_events = enabled;
        self
    }

    pub fn catalog(&self) -> &KitCatalog {
        &self.catalog
    }

    pub fn light_cones(&self) -> &LightConeCatalog {
        &self.light_cones
    }

    /// Initial state for `scenario` with overrides applied, plus the seed to run it with.
    pub fn prepare(&self, scenario: &Scenario) -> Result<(GameState, u64)> {
        let mut scenario = scenario.clone();
        if let Some(rounds) = self.rounds {
            scenario.options.rounds = rounds;
        }
        let seed = self.seed.unwrap_or(scenario.options.seed);

        let state = assemble(&scenario, &self.catalog, &self.light_cones)?;
        let state = if self.trace_events {
            state.with_handler(Arc::new(EventTracer::new()))
        } else {
            state
        };
        Ok((state, seed))
    }

    pub fn run(&self, scenario: &Scenario) -> Result<SimulationReport> {
        let (state, seed) = self.prepare(scenario)?;
        let mut rng = PcgRng::new(seed);
        let state = run_simulation(state, &mut rng)?;

        let report = SimulationReport::from_state(&state, seed);
        info!(
            target: "combat::runtime",
            outcome = %report.outcome,
            turns = report.turn_count,
            total_damage = report.result.total_damage_dealt,
            digest = %report.digest,
            "simulation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::EVENT_TRACER_ID;
    use combat_content::ScenarioLoader;
    use combat_core::{BattleOutcome, LogKind};

    fn scenario(hp: u32) -> Scenario {
        ScenarioLoader::from_toml(&format!(
            r#"
            [options]
            rounds = 3
            seed = 11

            [[party]]
            kit = "yanqing"
            equipment = [{{ stat = "crit_rate", value = 0.5 }}]

            [[party]]
            kit = "march_7th"

            [[party]]
            kit = "boothill"
            rotation = "s,b,b"

            [[enemies]]
            id = "target"
            hp = {hp}
            atk = 300
            spd = 90
            toughness = 90
            weaknesses = ["ice", "physical"]
            "#
        ))
        .unwrap()
    }

    #[test]
    fn same_seed_replays_identically() {
        let runner = Runner::default();
        let first = runner.run(&scenario(2_000_000)).unwrap();
        let second = runner.run(&scenario(2_000_000)).unwrap();
        assert_eq!(first.digest, second.digest);
        assert_eq!(first.log, second.log);
        assert_eq!(first.seed, 11);
    }

    #[test]
    fn seed_override_wins_over_scenario() {
        let report = Runner::default()
            .with_seed(Some(99))
            .run(&scenario(2_000_000))
            .unwrap();
        assert_eq!(report.seed, 99);
    }

    #[test]
    fn tough_enemy_times_out() {
        let report = Runner::default()
            .with_rounds(Some(1))
            .run(&scenario(50_000_000))
            .unwrap();
        assert_eq!(report.outcome, BattleOutcome::Timeout);
        assert!(report.result.total_damage_dealt > 0.0);
        assert!(matches!(report.log.first().map(|e| e.kind), Some(LogKind::BattleStart)));
        assert!(matches!(report.log.last().map(|e| e.kind), Some(LogKind::BattleEnd)));
    }

    #[test]
    fn frail_enemy_is_defeated() {
        let report = Runner::default().run(&scenario(1_000)).unwrap();
        assert_eq!(report.outcome, BattleOutcome::Victory);
    }

    #[test]
    fn event_trace_registers_a_tracer() {
        let (state, _) = Runner::default()
            .with_event_trace(true)
            .prepare(&scenario(1_000))
            .unwrap();
        assert_eq!(state.handlers.ids().last(), Some(&EVENT_TRACER_ID));
    }
}
