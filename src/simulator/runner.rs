//! Drives a [`TelemetryService`] against a [`SimulatedDungeon`].

use super::config::SimConfig;
use super::dungeon::SimulatedDungeon;
use super::report::SimReport;
use crate::service::TelemetryService;
use crate::snapshot::RunOutcome;
use crate::transport::Transport;

/// Run `config.steps` service steps back to back and report on them.
pub fn run_simulation<T: Transport>(
    config: &SimConfig,
    service: &mut TelemetryService<T>,
) -> SimReport {
    let mut dungeon = SimulatedDungeon::new(config.clone());
    let mut report = SimReport {
        steps: config.steps,
        ..Default::default()
    };

    for step in 0..config.steps {
        let summary = service.step(&mut dungeon);
        report.posts_sent += summary.sent;
        report.posts_failed += summary.failed;
        if summary.failed > 0 {
            log::debug!("Step {}: {} posts failed", step, summary.failed);
        }
        if !config.step_delay.is_zero() {
            std::thread::sleep(config.step_delay);
        }
    }

    summarize(&dungeon, &mut report);
    report
}

fn summarize(dungeon: &SimulatedDungeon, report: &mut SimReport) {
    report.games_started = dungeon.games_started();
    report.runs_finished = dungeon.runs().len();
    report.runs_won = dungeon
        .runs()
        .iter()
        .filter(|r| r.outcome() != RunOutcome::Lost)
        .count() as u32;
    report.deepest_level = dungeon
        .runs()
        .iter()
        .map(|r| r.deepest_level)
        .chain(std::iter::once(dungeon.current().state.deepest_level.max(0) as u32))
        .max()
        .unwrap_or(0);
    report.monsters_killed = dungeon.monsters_killed();
    report.monsties_spawned = dungeon.monsties_spawned();
}
