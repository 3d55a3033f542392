//! One reporter per telemetry family.
//!
//! Every reporter has the same shape: build a payload from the snapshot,
//! compare it with what was last delivered, post it if it differs, and
//! commit the cache only when the post went through.

pub mod flat_metrics;
pub mod gamestate;
pub mod gamestats;
pub mod items;
pub mod monsters;
pub mod player;

pub use flat_metrics::FlatMetricsReporter;
pub use gamestate::GameStateReporter;
pub use gamestats::GameStatsReporter;
pub use items::ItemsReporter;
pub use monsters::MonsterReporter;
pub use player::PlayerReporter;

use crate::client::PortalClient;
use crate::error::PortalError;
use crate::snapshot::GameSnapshot;
use crate::transport::Transport;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReporterKind {
    Player,
    Monsters,
    Items,
    GameState,
    GameStats,
    FlatMetrics,
}

impl ReporterKind {
    pub fn all() -> [ReporterKind; 6] {
        [
            ReporterKind::Player,
            ReporterKind::Monsters,
            ReporterKind::Items,
            ReporterKind::GameState,
            ReporterKind::GameStats,
            ReporterKind::FlatMetrics,
        ]
    }

    /// Name used in `PORTAL_DISABLE` and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            ReporterKind::Player => "player",
            ReporterKind::Monsters => "monsters",
            ReporterKind::Items => "items",
            ReporterKind::GameState => "gamestate",
            ReporterKind::GameStats => "gamestats",
            ReporterKind::FlatMetrics => "metrics",
        }
    }

    pub fn from_name(name: &str) -> Option<ReporterKind> {
        let name = name.trim().to_ascii_lowercase();
        Self::all().into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one reporter did during one tick.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Posts that reached the portal
    pub sent: usize,
    pub failures: Vec<PortalError>,
    /// The reporter did not look at the snapshot at all
    pub skipped: bool,
}

impl Outcome {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Nothing needed sending.
    pub fn is_unchanged(&self) -> bool {
        !self.skipped && self.sent == 0 && self.failures.is_empty()
    }

    /// Tally a post. Returns true when it succeeded, so the caller knows
    /// whether to commit its cache.
    pub fn record(&mut self, result: Result<(), PortalError>) -> bool {
        match result {
            Ok(()) => {
                self.sent += 1;
                true
            }
            Err(e) => {
                self.failures.push(e);
                false
            }
        }
    }

    pub fn merge(&mut self, other: Outcome) {
        self.sent += other.sent;
        self.failures.extend(other.failures);
        self.skipped &= other.skipped;
    }
}

pub trait Reporter<T: Transport>: Send {
    fn kind(&self) -> ReporterKind;

    /// Post whatever changed since the last successful delivery.
    fn report(&mut self, snapshot: &GameSnapshot, client: &PortalClient<T>) -> Outcome;

    /// Forget everything delivered so the next report posts again.
    fn reset(&mut self);

    /// Whether this reporter keeps running once `game_has_ended` is set.
    fn reports_after_game_end(&self) -> bool {
        false
    }
}

/// Every reporter that is not disabled, in posting order.
pub fn build_reporters<T: Transport>(
    enabled: impl Fn(ReporterKind) -> bool,
) -> Vec<Box<dyn Reporter<T>>> {
    let mut reporters: Vec<Box<dyn Reporter<T>>> = Vec::new();
    for kind in ReporterKind::all() {
        if !enabled(kind) {
            log::info!("Reporter {} disabled", kind);
            continue;
        }
        let reporter: Box<dyn Reporter<T>> = match kind {
            ReporterKind::Player => Box::new(PlayerReporter::new()),
            ReporterKind::Monsters => Box::new(MonsterReporter::new()),
            ReporterKind::Items => Box::new(ItemsReporter::new()),
            ReporterKind::GameState => Box::new(GameStateReporter::new()),
            ReporterKind::GameStats => Box::new(GameStatsReporter::new()),
            ReporterKind::FlatMetrics => Box::new(FlatMetricsReporter::new()),
        };
        reporters.push(reporter);
    }
    reporters
}
