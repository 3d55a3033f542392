use super::{Outcome, Reporter, ReporterKind};
use crate::client::PortalClient;
use crate::payload::{EquippedItemsPayload, PackPayload};
use crate::snapshot::GameSnapshot;
use crate::tracker::LastSent;
use crate::transport::Transport;

/// Equipped slots and pack contents, tracked separately so a change in one
/// does not resend the other.
#[derive(Debug, Default)]
pub struct ItemsReporter {
    equipped: LastSent<EquippedItemsPayload>,
    pack: LastSent<PackPayload>,
}

impl ItemsReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Reporter<T> for ItemsReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Items
    }

    fn report(&mut self, snapshot: &GameSnapshot, client: &PortalClient<T>) -> Outcome {
        let mut outcome = Outcome::default();

        let equipped = EquippedItemsPayload::from(&snapshot.equipped);
        if self.equipped.changed(&equipped) && outcome.record(client.send_equipped_items(&equipped)) {
            self.equipped.commit(&equipped);
        }

        let pack = PackPayload::from_items(&snapshot.pack);
        if self.pack.changed(&pack) && outcome.record(client.send_pack(&pack)) {
            log::debug!("Sent pack with {} items", pack.pack.len());
            self.pack.commit(&pack);
        }

        outcome
    }

    fn reset(&mut self) {
        self.equipped.reset();
        self.pack.reset();
    }
}
