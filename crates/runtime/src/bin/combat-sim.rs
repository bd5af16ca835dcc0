//! Runs a battle scenario and prints its report.
//!
//! ```bash
//! combat-sim scenarios/yanqing.toml --seed 7 --rounds 5
//! RUST_LOG=combat::events=trace combat-sim scenarios/yanqing.toml --trace-events
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use combat_content::{KitCatalog, LightConeCatalog, ScenarioLoader};
use combat_runtime::Runner;

/// Turn-based combat simulator
#[derive(Parser)]
#[command(name = "combat-sim")]
#[command(about = "Simulate a party-vs-enemy battle from a scenario file", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario file (`.toml` or `.ron`)
    #[arg(required_unless_present = "list_kits")]
    scenario: Option<PathBuf>,

    /// Random seed; overrides the scenario's own
    #[arg(long)]
    seed: Option<u64>,

    /// Round budget; overrides the scenario's own
    #[arg(long)]
    rounds: Option<u32>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Log every published event under `combat::events`
    #[arg(long)]
    trace_events: bool,

    /// List the available kits and light cones and exit
    #[arg(long)]
    list_kits: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    setup_logging();

    let cli = Cli::parse();
    let catalog = KitCatalog::standard();

    if cli.list_kits {
        for id in catalog.ids() {
            println!("{id}");
        }
        for id in LightConeCatalog::standard().ids() {
            println!("light_cone:{id}");
        }
        return Ok(());
    }
    let Some(path) = cli.scenario else {
        anyhow::bail!("no scenario given");
    };

    let scenario = ScenarioLoader::load(&path)
        .with_context(|| format!("Failed to load scenario {}", path.display()))?;
    let report = Runner::new(catalog)
        .with_seed(cli.seed)
        .with_rounds(cli.rounds)
        .with_event_trace(cli.trace_events)
        .run(&scenario)?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
