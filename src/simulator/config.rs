//! Simulation configuration.

use std::time::Duration;

/// Configuration for a simulated dungeon run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Telemetry steps to drive
    pub steps: u64,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Depth whose stairs lead out of the dungeon
    pub max_depth: i32,

    /// Monsters placed on each freshly generated level
    pub monsters_per_level: usize,

    /// Game turns that pass per step
    pub turns_per_step: i64,

    /// Start a new game once the current one ends
    pub restart_after_end: bool,

    /// Pause between steps, to pace a run against a live portal
    pub step_delay: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            steps: 600,
            seed: None,
            max_depth: 26,
            monsters_per_level: 6,
            turns_per_step: 10,
            restart_after_end: true,
            step_delay: Duration::ZERO,
        }
    }
}

impl SimConfig {
    /// Short deterministic run for tests and dry runs.
    pub fn quick_test(seed: u64) -> Self {
        Self {
            steps: 50,
            seed: Some(seed),
            max_depth: 5,
            monsters_per_level: 3,
            ..Default::default()
        }
    }
}
