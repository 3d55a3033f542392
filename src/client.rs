//! Typed calls to each portal endpoint.

use crate::endpoints::Endpoint;
use crate::error::PortalError;
use crate::payload::{
    EquippedItemsPayload, FlatMetricsPayload, GameStatePayload, GameStatsPayload,
    MonsterDeathPayload, MonsterPayload, PackPayload, PlayerPayload,
};
use crate::transport::Transport;
use serde::Serialize;
use serde_json::Value;

pub struct PortalClient<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> PortalClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        endpoint.url(&self.base_url)
    }

    /// POST `payload` to `endpoint`, or an empty POST when the endpoint
    /// takes no body.
    fn post<P: Serialize>(&self, endpoint: Endpoint, payload: &P) -> Result<(), PortalError> {
        let url = self.url(endpoint);
        if !endpoint.has_body() {
            self.transport.post_json(&url, None)?;
            log::debug!("Sent {}", endpoint);
            return Ok(());
        }
        let body = serde_json::to_value(payload)?;
        self.transport.post_json(&url, Some(&body))?;
        log::debug!("Sent {} ({} bytes)", endpoint, body.to_string().len());
        Ok(())
    }

    pub fn send_monsters(&self, monsters: &[MonsterPayload]) -> Result<(), PortalError> {
        self.post(Endpoint::MonstersUpdate, &monsters)
    }

    pub fn send_monster_death(&self, id: i32) -> Result<(), PortalError> {
        self.post(Endpoint::MonsterDeath, &MonsterDeathPayload::new(id))
    }

    pub fn send_monster_reset(&self) -> Result<(), PortalError> {
        self.post(Endpoint::MonstersReset, &())
    }

    pub fn send_player(&self, player: &PlayerPayload) -> Result<(), PortalError> {
        self.post(Endpoint::PlayerUpdate, player)
    }

    pub fn send_player_death(&self, player: &PlayerPayload) -> Result<(), PortalError> {
        self.post(Endpoint::PlayerDeath, player)
    }

    pub fn send_player_reset(&self) -> Result<(), PortalError> {
        self.post(Endpoint::PlayerReset, &())
    }

    pub fn send_equipped_items(&self, items: &EquippedItemsPayload) -> Result<(), PortalError> {
        self.post(Endpoint::EquippedItems, items)
    }

    pub fn send_pack(&self, pack: &PackPayload) -> Result<(), PortalError> {
        self.post(Endpoint::Pack, pack)
    }

    pub fn send_gamestate(&self, state: &GameStatePayload) -> Result<(), PortalError> {
        self.post(Endpoint::GameState, state)
    }

    pub fn send_gamestats(&self, stats: &GameStatsPayload) -> Result<(), PortalError> {
        self.post(Endpoint::GameStats, stats)
    }

    pub fn send_game_reset(&self) -> Result<(), PortalError> {
        self.post(Endpoint::GameReset, &())
    }

    pub fn send_flat_metrics(&self, metrics: &FlatMetricsPayload) -> Result<(), PortalError> {
        self.post(Endpoint::Metrics, metrics)
    }

    /// Whether an admin has flagged this monster to be killed.
    pub fn is_monster_in_admin_kills(&self, monster_id: i32) -> Result<bool, PortalError> {
        let url = self.url(Endpoint::AdminKill(monster_id));
        let body = self.transport.get_json(&url)?;
        parse_admin_kill(&body).ok_or_else(|| PortalError::BadResponse {
            url,
            message: format!("expected a boolean, got {}", body),
        })
    }

    /// Pod names the portal wants spawned as monsties. The portal forgets
    /// them once handed out.
    pub fn fetch_new_monsties(&self) -> Result<Vec<String>, PortalError> {
        let url = self.url(Endpoint::NewMonsties);
        let body = self.transport.get_json(&url)?;
        parse_pod_names(&body).ok_or_else(|| PortalError::BadResponse {
            url,
            message: "missing \"pod-names\" array".to_string(),
        })
    }
}

/// Accepts a bare boolean or an object with an `admin_kill` /
/// `in_admin_kills` boolean.
fn parse_admin_kill(body: &Value) -> Option<bool> {
    match body {
        Value::Bool(b) => Some(*b),
        Value::Object(map) => map
            .get("admin_kill")
            .or_else(|| map.get("in_admin_kills"))
            .and_then(Value::as_bool),
        _ => None,
    }
}

fn parse_pod_names(body: &Value) -> Option<Vec<String>> {
    let names = body.get("pod-names")?.as_array()?;
    Some(
        names
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
