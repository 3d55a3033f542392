//! Fixed portal endpoints.
//!
//! Every telemetry family has exactly one path under the portal base URL.
//! The two GET endpoints are queries the game makes back to the portal.

use std::fmt;

/// Base URL of the in-cluster portal service.
pub const DEFAULT_BASE_URL: &str = "http://portal-service.portal:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    MonstersUpdate,
    MonsterDeath,
    MonstersReset,
    PlayerUpdate,
    PlayerDeath,
    PlayerReset,
    EquippedItems,
    Pack,
    GameState,
    GameStats,
    GameReset,
    /// Flat player metrics push, predates the per-family endpoints.
    Metrics,
    AdminKill(i32),
    NewMonsties,
}

impl Endpoint {
    /// Every fixed endpoint, in the order `endpoints` prints them.
    pub fn all() -> [Endpoint; 14] {
        [
            Endpoint::MonstersUpdate,
            Endpoint::MonsterDeath,
            Endpoint::MonstersReset,
            Endpoint::PlayerUpdate,
            Endpoint::PlayerDeath,
            Endpoint::PlayerReset,
            Endpoint::EquippedItems,
            Endpoint::Pack,
            Endpoint::GameState,
            Endpoint::GameStats,
            Endpoint::GameReset,
            Endpoint::Metrics,
            Endpoint::AdminKill(0),
            Endpoint::NewMonsties,
        ]
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::MonstersUpdate => "/monsters/update".to_string(),
            Endpoint::MonsterDeath => "/monsters/death".to_string(),
            Endpoint::MonstersReset => "/monsters/reset".to_string(),
            Endpoint::PlayerUpdate => "/player/update".to_string(),
            Endpoint::PlayerDeath => "/player/death".to_string(),
            Endpoint::PlayerReset => "/player/reset".to_string(),
            Endpoint::EquippedItems => "/items/update".to_string(),
            Endpoint::Pack => "/pack/update".to_string(),
            Endpoint::GameState => "/gamestate/update".to_string(),
            Endpoint::GameStats => "/gamestats/update".to_string(),
            Endpoint::GameReset => "/game/reset".to_string(),
            Endpoint::Metrics => "/metrics".to_string(),
            Endpoint::AdminKill(id) => format!("/admin-kills/{}", id),
            Endpoint::NewMonsties => "/monsties/new".to_string(),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::AdminKill(_) | Endpoint::NewMonsties => Method::Get,
            _ => Method::Post,
        }
    }

    /// Reset endpoints are posted without a body.
    pub fn has_body(&self) -> bool {
        !matches!(
            self,
            Endpoint::MonstersReset
                | Endpoint::PlayerReset
                | Endpoint::GameReset
                | Endpoint::AdminKill(_)
                | Endpoint::NewMonsties
        )
    }

    /// Full URL under `base`. Tolerates a trailing slash on the base.
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self.method() {
            Method::Get => "GET",
            Method::Post => "POST",
        };
        write!(f, "{} {}", method, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_without_double_slash() {
        assert_eq!(
            Endpoint::PlayerUpdate.url("http://portal-service.portal:5000/"),
            "http://portal-service.portal:5000/player/update"
        );
        assert_eq!(
            Endpoint::PlayerUpdate.url(DEFAULT_BASE_URL),
            "http://portal-service.portal:5000/player/update"
        );
    }

    #[test]
    fn test_admin_kill_url_embeds_id() {
        assert_eq!(
            Endpoint::AdminKill(42).url("http://p"),
            "http://p/admin-kills/42"
        );
    }

    #[test]
    fn test_item_endpoints_use_collector_paths() {
        assert_eq!(Endpoint::EquippedItems.path(), "/items/update");
        assert_eq!(Endpoint::Pack.path(), "/pack/update");
        assert_eq!(Endpoint::GameStats.path(), "/gamestats/update");
    }

    #[test]
    fn test_resets_have_no_body() {
        assert!(!Endpoint::MonstersReset.has_body());
        assert!(!Endpoint::PlayerReset.has_body());
        assert!(!Endpoint::GameReset.has_body());
        assert!(Endpoint::MonsterDeath.has_body());
    }

    #[test]
    fn test_queries_are_get() {
        assert_eq!(Endpoint::NewMonsties.method(), Method::Get);
        assert_eq!(Endpoint::AdminKill(1).method(), Method::Get);
        assert_eq!(Endpoint::Metrics.method(), Method::Post);
    }

    #[test]
    fn test_all_paths_are_unique() {
        let mut paths: Vec<String> = Endpoint::all().iter().map(|e| e.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), Endpoint::all().len());
    }

    #[test]
    fn test_display_shows_method_and_path() {
        assert_eq!(Endpoint::GameReset.to_string(), "POST /game/reset");
        assert_eq!(Endpoint::NewMonsties.to_string(), "GET /monsties/new");
    }
}
