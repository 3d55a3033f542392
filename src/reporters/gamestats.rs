use super::{Outcome, Reporter, ReporterKind};
use crate::client::PortalClient;
use crate::payload::GameStatsPayload;
use crate::snapshot::{GameSnapshot, GameStats};
use crate::tracker::LastSent;
use crate::transport::Transport;

/// Lifetime statistics aggregated from the run history.
#[derive(Debug, Default)]
pub struct GameStatsReporter {
    last: LastSent<GameStatsPayload>,
}

impl GameStatsReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Reporter<T> for GameStatsReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::GameStats
    }

    fn report(&mut self, snapshot: &GameSnapshot, client: &PortalClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        let stats = GameStats::from_runs(&snapshot.run_history);
        let payload = GameStatsPayload::from(&stats);
        if self.last.changed(&payload) && outcome.record(client.send_gamestats(&payload)) {
            log::debug!("Sent game stats over {} games", stats.games);
            self.last.commit(&payload);
        }
        outcome
    }

    fn reset(&mut self) {
        self.last.reset();
    }

    // A finished run is exactly when the history grows.
    fn reports_after_game_end(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::RunRecord;
    use crate::transport::MemoryTransport;

    fn run(seed: u64, result: &str) -> RunRecord {
        RunRecord {
            seed,
            result: result.to_string(),
            score: 100,
            turns: 1000,
            deepest_level: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_run_resends_stats() {
        let transport = MemoryTransport::new();
        let client = PortalClient::new(transport.clone(), "http://p");
        let mut reporter = GameStatsReporter::new();
        let mut snap = GameSnapshot::default();
        snap.run_history.push(run(1, "Killed by a jackal"));

        reporter.report(&snap, &client);
        reporter.report(&snap, &client);
        snap.run_history.push(run(2, "Escaped"));
        reporter.report(&snap, &client);

        let posts = transport.requests_to("/gamestats/update");
        assert_eq!(posts.len(), 2);
        let body = posts[1].body.as_ref().unwrap();
        assert_eq!(body["games"], 2);
        assert_eq!(body["won"], 1);
        assert_eq!(body["winRate"], 50.0);
    }

    #[test]
    fn test_zero_seed_runs_are_ignored() {
        let transport = MemoryTransport::new();
        let client = PortalClient::new(transport.clone(), "http://p");
        let mut reporter = GameStatsReporter::new();
        let mut snap = GameSnapshot::default();
        snap.run_history.push(run(0, "Escaped"));

        reporter.report(&snap, &client);
        let posts = transport.requests_to("/gamestats/update");
        assert_eq!(posts[0].body.as_ref().unwrap()["games"], 0);
    }

    #[test]
    fn test_runs_after_game_end() {
        let reporter = GameStatsReporter::new();
        assert!(Reporter::<MemoryTransport>::reports_after_game_end(&reporter));
    }
}
