use super::{Outcome, Reporter, ReporterKind};
use crate::client::PortalClient;
use crate::payload::FlatMetricsPayload;
use crate::snapshot::GameSnapshot;
use crate::tracker::LastSent;
use crate::transport::Transport;

/// The single-record `/metrics` push older portal deployments expect.
#[derive(Debug, Default)]
pub struct FlatMetricsReporter {
    last: LastSent<FlatMetricsPayload>,
}

impl FlatMetricsReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Reporter<T> for FlatMetricsReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::FlatMetrics
    }

    fn report(&mut self, snapshot: &GameSnapshot, client: &PortalClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        let payload = FlatMetricsPayload::from(snapshot);
        if self.last.changed(&payload) && outcome.record(client.send_flat_metrics(&payload)) {
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

    #[test]
    fn test_posts_flat_record_on_change() {
        let transport = MemoryTransport::new();
        let client = PortalClient::new(transport.clone(), "http://p");
        let mut reporter = FlatMetricsReporter::new();
        let mut snap = GameSnapshot::default();

        reporter.report(&snap, &client);
        reporter.report(&snap, &client);
        snap.player.current_hp = 12;
        reporter.report(&snap, &client);

        let posts = transport.requests_to("/metrics");
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].body.as_ref().unwrap()["hp"], 12);
    }
}
