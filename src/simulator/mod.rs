//! Seeded dungeon simulator.
//!
//! Stands in for the game engine so the whole reporting path can be driven
//! without it: the CLI `simulate` command uses it against a live portal or a
//! memory transport, and the integration tests use it with fixed seeds.

mod config;
mod dungeon;
mod report;
mod runner;

pub use config::SimConfig;
pub use dungeon::SimulatedDungeon;
pub use report::SimReport;
pub use runner::run_simulation;
