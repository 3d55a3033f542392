use super::{Outcome, Reporter, ReporterKind};
use crate::client::PortalClient;
use crate::payload::GameStatePayload;
use crate::snapshot::GameSnapshot;
use crate::tracker::LastSent;
use crate::transport::Transport;

#[derive(Debug, Default)]
pub struct GameStateReporter {
    last: LastSent<GameStatePayload>,
}

impl GameStateReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Reporter<T> for GameStateReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::GameState
    }

    fn report(&mut self, snapshot: &GameSnapshot, client: &PortalClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        let payload = GameStatePayload::from(&snapshot.state);
        if self.last.changed(&payload) && outcome.record(client.send_gamestate(&payload)) {
            self.last.commit(&payload);
        }
        outcome
    }

    fn reset(&mut self) {
        self.last.reset();
    }
}
