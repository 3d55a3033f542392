//! Monster roster and deaths.
//!
//! Living monsters are batched into one `/monsters/update` array per tick,
//! carrying only the entries that changed. A monster the engine has marked
//! as died gets exactly one `/monsters/death` post per id.

use super::{Outcome, Reporter, ReporterKind};
use crate::client::PortalClient;
use crate::payload::MonsterPayload;
use crate::snapshot::{GameSnapshot, MonsterSnapshot, MAX_MONSTERS};
use crate::tracker::KeyedCache;
use crate::transport::Transport;
use std::collections::HashSet;

/// Cached per id: the level the monster was on and what was sent.
type Entry = (usize, MonsterPayload);

#[derive(Debug, Default)]
pub struct MonsterReporter {
    sent: KeyedCache<i32, Entry>,
    deaths_sent: HashSet<i32>,
}

impl MonsterReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked(&self) -> usize {
        self.sent.len()
    }

    pub fn death_reported(&self, id: i32) -> bool {
        self.deaths_sent.contains(&id)
    }

    /// Post a roster entry marking `monster` dead, then its death, unless
    /// the death already went out.
    pub fn report_death<T: Transport>(
        &mut self,
        monster: &MonsterSnapshot,
        client: &PortalClient<T>,
    ) -> Outcome {
        let mut outcome = Outcome::default();
        if self.deaths_sent.contains(&monster.id) {
            return outcome;
        }
        let mut payload = MonsterPayload::from(monster);
        payload.is_dead = true;
        outcome.record(client.send_monsters(std::slice::from_ref(&payload)));
        self.send_death(monster.id, client, &mut outcome);
        outcome
    }

    fn send_death<T: Transport>(&mut self, id: i32, client: &PortalClient<T>, outcome: &mut Outcome) {
        if self.deaths_sent.contains(&id) {
            return;
        }
        if outcome.record(client.send_monster_death(id)) {
            log::debug!("Reported death of monster {}", id);
            self.deaths_sent.insert(id);
            self.sent.retain(|k| *k != id);
        }
    }
}

impl<T: Transport> Reporter<T> for MonsterReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Monsters
    }

    fn report(&mut self, snapshot: &GameSnapshot, client: &PortalClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        let mut batch: Vec<(usize, MonsterPayload)> = Vec::new();
        let mut present: HashSet<i32> = HashSet::new();

        for (level, monster) in snapshot.visible_monsters() {
            if monster.has_died {
                self.send_death(monster.id, client, &mut outcome);
                continue;
            }
            present.insert(monster.id);

            let entry = (level, MonsterPayload::from(monster));
            if !monster.id_in_range() {
                log::warn!(
                    "Monster id {} outside 0..{}, sending without caching",
                    monster.id,
                    MAX_MONSTERS
                );
                batch.push(entry);
                continue;
            }
            if self.sent.changed(&monster.id, &entry) {
                batch.push(entry);
            }
        }

        self.sent.retain(|id| present.contains(id));

        if batch.is_empty() {
            return outcome;
        }

        let payloads: Vec<MonsterPayload> = batch.iter().map(|(_, p)| p.clone()).collect();
        if outcome.record(client.send_monsters(&payloads)) {
            log::debug!("Sent {} monster updates", payloads.len());
            for (level, payload) in batch {
                let id = payload.id;
                if (0..MAX_MONSTERS).contains(&id) {
                    self.sent.commit(id, (level, payload));
                }
            }
        }
        outcome
    }

    fn reset(&mut self) {
        self.sent.reset();
        self.deaths_sent.clear();
    }
}
