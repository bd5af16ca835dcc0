//! Battle runtime: scenario assembly, seeded runs and reports.
//!
//! The runtime turns a [`combat_content::Scenario`] into a
//! [`combat_core::GameState`], drives it with a seeded
//! [`combat_core::PcgRng`] and summarizes the finished battle as a
//! [`SimulationReport`]. The `combat-sim` binary is a thin front-end over
//! [`Runner`].
pub mod assembly;
pub mod error;
pub mod report;
pub mod runner;
pub mod tracer;

pub use assembly::{assemble, enemy_unit};
pub use error::{Result, RuntimeError};
pub use report::SimulationReport;
pub use runner::Runner;
pub use tracer::{EVENT_TRACER_ID, EventTracer};
