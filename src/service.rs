//! The telemetry service: owns the client, reporters and shared metrics,
//! and runs them against engine snapshots.
//!
//! [`TelemetryService::step`] is one iteration of the background loop;
//! [`TelemetryService::spawn`] runs it on its own thread until stopped.

use crate::client::PortalClient;
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::metrics::{AdminKillQueue, SharedMetrics};
use crate::payload::PlayerPayload;
use crate::reporters::{build_reporters, MonsterReporter, Outcome, Reporter, ReporterKind};
use crate::snapshot::{GameSnapshot, GameSource, MonsterSnapshot, PlayerSnapshot};
use crate::transport::Transport;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// The monstie endpoint is polled once every this many steps.
pub const MONSTIE_POLL_STEPS: u64 = 10;

/// Longest the background thread sleeps before rechecking its stop flag.
const STOP_CHECK: Duration = Duration::from_millis(50);

/// Posts made and failed by one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub sent: usize,
    pub failed: usize,
}

impl TickSummary {
    fn add(&mut self, other: TickSummary) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

pub struct TelemetryService<T: Transport> {
    client: PortalClient<T>,
    monsters: Option<MonsterReporter>,
    reporters: Vec<Box<dyn Reporter<T>>>,
    metrics: SharedMetrics,
    admin_kills: AdminKillQueue,
    steps: u64,
    current_seed: Option<u64>,
    game_was_ended: bool,
}

impl<T: Transport> TelemetryService<T> {
    pub fn new(client: PortalClient<T>, config: &PortalConfig) -> Self {
        let monsters = config
            .is_enabled(ReporterKind::Monsters)
            .then(MonsterReporter::new);
        let reporters =
            build_reporters(|kind| kind != ReporterKind::Monsters && config.is_enabled(kind));
        Self {
            client,
            monsters,
            reporters,
            metrics: SharedMetrics::new(),
            admin_kills: AdminKillQueue::new(),
            steps: 0,
            current_seed: None,
            game_was_ended: false,
        }
    }

    pub fn client(&self) -> &PortalClient<T> {
        &self.client
    }

    /// Handle for the `/metrics` server.
    pub fn metrics(&self) -> SharedMetrics {
        self.metrics.clone()
    }

    /// Queue the metrics server pushes admin kill requests onto.
    pub fn admin_kills(&self) -> AdminKillQueue {
        self.admin_kills.clone()
    }

    /// Run every enabled reporter against `snapshot`. Failures are logged
    /// and do not stop the other reporters.
    pub fn tick(&mut self, snapshot: &GameSnapshot) -> TickSummary {
        self.metrics.update_from(snapshot);
        let ended = snapshot.state.game_has_ended;
        let mut summary = TickSummary::default();

        if let Some(monsters) = self.monsters.as_mut() {
            if ended {
                log::trace!("Game over, monsters reporter idle");
            } else {
                let outcome = monsters.report(snapshot, &self.client);
                summary.add(absorb_outcome(ReporterKind::Monsters, outcome));
            }
        }

        for reporter in self.reporters.iter_mut() {
            if ended && !reporter.reports_after_game_end() {
                log::trace!("Game over, {} reporter idle", reporter.kind());
                continue;
            }
            let outcome = reporter.report(snapshot, &self.client);
            if outcome.is_unchanged() {
                log::trace!("{} unchanged", reporter.kind());
            }
            summary.add(absorb_outcome(reporter.kind(), outcome));
        }

        self.metrics.record_posts(summary.sent, summary.failed);
        summary
    }

    /// Forget everything sent and tell the portal a new game started.
    /// Admin kills still queued were meant for the previous game and are
    /// dropped.
    pub fn new_game(&mut self) -> TickSummary {
        log::info!("New game, resetting portal state");
        self.discard_admin_kills("a new game started");
        if let Some(monsters) = self.monsters.as_mut() {
            Reporter::<T>::reset(monsters);
        }
        for reporter in self.reporters.iter_mut() {
            reporter.reset();
        }

        let mut summary = TickSummary::default();
        summary.add(absorb_result("monster reset", self.client.send_monster_reset()));
        summary.add(absorb_result("player reset", self.client.send_player_reset()));
        summary.add(absorb_result("game reset", self.client.send_game_reset()));
        self.metrics.record_posts(summary.sent, summary.failed);
        summary
    }

    /// Mark `monster` dead on the roster and post its death once.
    pub fn monster_died(&mut self, monster: &MonsterSnapshot) -> TickSummary {
        let Some(monsters) = self.monsters.as_mut() else {
            return TickSummary::default();
        };
        let outcome = monsters.report_death(monster, &self.client);
        let summary = absorb_outcome(ReporterKind::Monsters, outcome);
        self.metrics.record_posts(summary.sent, summary.failed);
        summary
    }

    pub fn player_died(&mut self, player: &PlayerSnapshot) -> TickSummary {
        log::info!(
            "Player died on depth {} with {} gold",
            player.depth_level,
            player.gold
        );
        let payload = PlayerPayload::from(player);
        let summary = absorb_result("player death", self.client.send_player_death(&payload));
        self.metrics.record_posts(summary.sent, summary.failed);
        summary
    }

    /// Ask the portal for new monsties and have the engine spawn each one.
    /// Returns how many were placed.
    pub fn poll_monsties(&mut self, source: &mut dyn GameSource) -> usize {
        if !source.accepts_commands() {
            log::trace!("Game source cannot spawn monsties, not polling");
            return 0;
        }
        let names = match self.client.fetch_new_monsties() {
            Ok(names) => names,
            Err(e) => {
                log::warn!("Could not fetch new monsties: {}", e);
                return 0;
            }
        };
        let mut spawned = 0;
        for name in &names {
            if source.spawn_monstie(name) {
                log::info!("Spawned monstie {}", name);
                spawned += 1;
            } else {
                log::warn!("Engine declined monstie {}", name);
            }
        }
        spawned
    }

    /// Whether the portal has flagged `monster_id` for an admin kill.
    /// Any failure reads as "no".
    pub fn admin_kill_check(&self, monster_id: i32) -> bool {
        self.client
            .is_monster_in_admin_kills(monster_id)
            .unwrap_or_else(|e| {
                log::warn!("Admin kill check for {} failed: {}", monster_id, e);
                false
            })
    }

    /// Hand queued admin kills to the engine. Returns how many it carried out.
    pub fn apply_admin_kills(&mut self, source: &mut dyn GameSource) -> usize {
        let mut killed = 0;
        for request in self.admin_kills.drain() {
            if source.kill_monster(request.monster_id) {
                log::info!("Admin killed {} ({})", request.monster_name, request.monster_id);
                killed += 1;
            } else {
                log::warn!("Admin kill target {} not found", request.monster_id);
            }
        }
        killed
    }

    /// Drop every queued admin kill. Returns how many were dropped.
    pub fn discard_admin_kills(&mut self, reason: &str) -> usize {
        let dropped = self.admin_kills.drain();
        for request in &dropped {
            log::warn!(
                "Dropping admin kill of {} ({}): {}",
                request.monster_name,
                request.monster_id,
                reason
            );
        }
        dropped.len()
    }

    /// One iteration of the background loop: snapshot, detect new games and
    /// player death, tick, then service admin kills and monsties.
    pub fn step(&mut self, source: &mut dyn GameSource) -> TickSummary {
        let mut summary = TickSummary::default();
        self.steps += 1;

        let Some(snapshot) = source.snapshot() else {
            log::trace!("No game loaded");
            self.discard_admin_kills("no game is loaded");
            return summary;
        };

        if snapshot.state.game_in_progress && self.current_seed != Some(snapshot.state.seed) {
            summary.add(self.new_game());
            self.current_seed = Some(snapshot.state.seed);
            self.game_was_ended = false;
        }

        let ended = snapshot.state.game_has_ended;
        if ended && !self.game_was_ended && snapshot.player.current_hp <= 0 {
            summary.add(self.player_died(&snapshot.player));
        }
        self.game_was_ended = ended;

        summary.add(self.tick(&snapshot));

        if ended {
            self.discard_admin_kills("the game has ended");
        } else if !source.accepts_commands() {
            self.discard_admin_kills("the game source cannot carry out kills");
        } else {
            self.apply_admin_kills(source);
            if self.steps % MONSTIE_POLL_STEPS == 1 {
                self.poll_monsties(source);
            }
        }
        summary
    }
}

fn absorb_result(what: &str, result: Result<(), PortalError>) -> TickSummary {
    let mut outcome = Outcome::default();
    if outcome.record(result) {
        log::debug!("Posted {}", what);
    }
    absorb_outcome(what, outcome)
}

fn absorb_outcome(what: impl fmt::Display, outcome: Outcome) -> TickSummary {
    for err in &outcome.failures {
        log::error!("{}: {}", what, err);
    }
    TickSummary {
        sent: outcome.sent,
        failed: outcome.failures.len(),
    }
}

impl<T: Transport + 'static> TelemetryService<T> {
    /// Run [`step`](Self::step) every `interval` on a background thread.
    pub fn spawn<S>(mut self, mut source: S, interval: Duration) -> std::io::Result<ServiceHandle>
    where
        S: GameSource + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("portal-telemetry".to_string())
            .spawn(move || {
                log::info!("Telemetry thread started, interval {:?}", interval);
                while !flag.load(Ordering::Relaxed) {
                    let started = Instant::now();
                    self.step(&mut source);
                    sleep_unless_stopped(&flag, interval.saturating_sub(started.elapsed()));
                }
                log::info!("Telemetry thread stopped after {} steps", self.steps);
            })?;

        Ok(ServiceHandle {
            stop,
            thread: Some(thread),
        })
    }
}

fn sleep_unless_stopped(flag: &AtomicBool, mut remaining: Duration) {
    while !remaining.is_zero() && !flag.load(Ordering::Relaxed) {
        let nap = remaining.min(STOP_CHECK);
        std::thread::sleep(nap);
        remaining -= nap;
    }
}

/// Controls the background telemetry thread. Dropping the handle stops it.
pub struct ServiceHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ServiceHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Ask the thread to stop after its current step.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Stop and wait for the thread to exit.
    pub fn join(mut self) -> std::thread::Result<()> {
        self.stop();
        match self.thread.take() {
            Some(thread) => thread.join(),
            None => Ok(()),
        }
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
