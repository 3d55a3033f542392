use super::{Outcome, Reporter, ReporterKind};
use crate::client::PortalClient;
use crate::payload::PlayerPayload;
use crate::snapshot::GameSnapshot;
use crate::tracker::LastSent;
use crate::transport::Transport;

#[derive(Debug, Default)]
pub struct PlayerReporter {
    last: LastSent<PlayerPayload>,
}

impl PlayerReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Reporter<T> for PlayerReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Player
    }

    fn report(&mut self, snapshot: &GameSnapshot, client: &PortalClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        let payload = PlayerPayload::from(&snapshot.player);
        if !self.last.changed(&payload) {
            return outcome;
        }
        if outcome.record(client.send_player(&payload)) {
            self.last.commit(&payload);
        }
        outcome
    }

    fn reset(&mut self) {
        self.last.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn setup() -> (PlayerReporter, PortalClient<MemoryTransport>, MemoryTransport) {
        let transport = MemoryTransport::new();
        let client = PortalClient::new(transport.clone(), "http://p");
        (PlayerReporter::new(), client, transport)
    }

    #[test]
    fn test_posts_only_on_change() {
        let (mut reporter, client, transport) = setup();
        let mut snap = GameSnapshot::default();
        snap.player.gold = 10;

        assert_eq!(reporter.report(&snap, &client).sent, 1);
        assert!(reporter.report(&snap, &client).is_unchanged());

        snap.player.gold = 11;
        assert_eq!(reporter.report(&snap, &client).sent, 1);
        assert_eq!(transport.requests_to("/player/update").len(), 2);
    }

    #[test]
    fn test_failed_post_is_retried() {
        let (mut reporter, client, transport) = setup();
        let snap = GameSnapshot::default();

        transport.set_fail_all(true);
        assert_eq!(reporter.report(&snap, &client).failures.len(), 1);
        transport.heal();
        assert_eq!(reporter.report(&snap, &client).sent, 1);
    }

    #[test]
    fn test_reset_reposts() {
        let (mut reporter, client, _transport) = setup();
        let snap = GameSnapshot::default();
        reporter.report(&snap, &client);
        Reporter::<MemoryTransport>::reset(&mut reporter);
        assert_eq!(reporter.report(&snap, &client).sent, 1);
    }
}
