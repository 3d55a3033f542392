//! Live gauges shared between the telemetry thread and the `/metrics`
//! endpoint.
//!
//! One mutex guards everything; the tick writes, the server reads.

pub mod server;

pub use server::{handle_request, AdminKillQueue, AdminKillRequest, HttpReply, MAX_PENDING_KILLS};

#[cfg(feature = "server")]
pub use server::{spawn_metrics_server, start_metrics_server};

use crate::snapshot::GameSnapshot;
use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameMetrics {
    pub gold: i32,
    pub depth_level: i32,
    pub current_hp: i32,
    pub turns: i64,
    pub deepest_level: i32,
    pub monsters_alive: usize,
    pub posts_total: u64,
    pub post_failures_total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SharedMetrics {
    inner: Arc<Mutex<GameMetrics>>,
}

struct MetricDef {
    name: &'static str,
    help: &'static str,
    kind: &'static str,
    value: fn(&GameMetrics) -> String,
}

const METRICS: &[MetricDef] = &[
    MetricDef {
        name: "brogue_player_turns",
        help: "Absolute turn number",
        kind: "counter",
        value: |m| m.turns.to_string(),
    },
    MetricDef {
        name: "brogue_depth_level",
        help: "Current dungeon depth",
        kind: "gauge",
        value: |m| m.depth_level.to_string(),
    },
    MetricDef {
        name: "brogue_player_gold",
        help: "Gold carried by the player",
        kind: "counter",
        value: |m| m.gold.to_string(),
    },
    MetricDef {
        name: "brogue_player_currentHP",
        help: "Player hit points",
        kind: "gauge",
        value: |m| m.current_hp.to_string(),
    },
    MetricDef {
        name: "brogue_deepest_level",
        help: "Deepest level reached this run",
        kind: "gauge",
        value: |m| m.deepest_level.to_string(),
    },
    MetricDef {
        name: "brogue_monsters_alive",
        help: "Living monsters on visited levels",
        kind: "gauge",
        value: |m| m.monsters_alive.to_string(),
    },
    MetricDef {
        name: "brogue_portal_posts_total",
        help: "Posts delivered to the portal",
        kind: "counter",
        value: |m| m.posts_total.to_string(),
    },
    MetricDef {
        name: "brogue_portal_post_failures_total",
        help: "Posts to the portal that failed",
        kind: "counter",
        value: |m| m.post_failures_total.to_string(),
    },
];

impl SharedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GameMetrics> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update_from(&self, snapshot: &GameSnapshot) {
        let monsters_alive = snapshot.monsters_alive();
        let mut m = self.lock();
        m.gold = snapshot.player.gold;
        m.depth_level = snapshot.player.depth_level;
        m.current_hp = snapshot.player.current_hp;
        m.turns = snapshot.state.absolute_turn_number;
        m.deepest_level = snapshot.state.deepest_level;
        m.monsters_alive = monsters_alive;
    }

    pub fn record_posts(&self, sent: usize, failed: usize) {
        let mut m = self.lock();
        m.posts_total += sent as u64;
        m.post_failures_total += failed as u64;
    }

    pub fn get(&self) -> GameMetrics {
        *self.lock()
    }

    /// Prometheus text exposition format.
    pub fn render_prometheus(&self) -> String {
        render_prometheus(&self.get())
    }
}

pub fn render_prometheus(metrics: &GameMetrics) -> String {
    let mut out = String::new();
    for def in METRICS {
        // Writing into a String cannot fail
        let _ = writeln!(out, "# HELP {} {}", def.name, def.help);
        let _ = writeln!(out, "# TYPE {} {}", def.name, def.kind);
        let _ = writeln!(out, "{} {}", def.name, (def.value)(metrics));
    }
    out
}
