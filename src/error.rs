//! Error types for portal delivery and configuration.

use thiserror::Error;

/// A failure talking to the portal.
///
/// None of these are fatal to the game: callers log them and move on.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Connection refused, DNS failure, timeout and the like.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The portal answered with a non-success status.
    #[error("portal returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The portal answered 2xx but the body was not what we expected.
    #[error("unexpected response from {url}: {message}")]
    BadResponse { url: String, message: String },
}

impl PortalError {
    pub fn url(&self) -> Option<&str> {
        match self {
            PortalError::Transport { url, .. }
            | PortalError::Status { url, .. }
            | PortalError::BadResponse { url, .. } => Some(url),
            PortalError::Json(_) => None,
        }
    }
}

impl From<ureq::Error> for PortalError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => PortalError::Status {
                url: response.get_url().to_string(),
                status,
            },
            ureq::Error::Transport(transport) => PortalError::Transport {
                url: transport
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string()),
                message: transport.to_string(),
            },
        }
    }
}

/// A configuration value that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown reporter {0:?} (expected one of: player, monsters, items, gamestate, gamestats, metrics)")]
    UnknownReporter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message_includes_url_and_code() {
        let err = PortalError::Status {
            url: "http://portal/player/update".to_string(),
            status: 503,
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("/player/update"));
        assert_eq!(err.url(), Some("http://portal/player/update"));
    }

    #[test]
    fn test_json_error_has_no_url() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = PortalError::from(json_err);
        assert!(err.url().is_none());
        assert!(err.to_string().starts_with("json error"));
    }

    #[test]
    fn test_config_error_names_variable() {
        let err = ConfigError::InvalidValue {
            name: "PORTAL_TICK_MS",
            value: "soon".to_string(),
            reason: "not a number".to_string(),
        };
        assert!(err.to_string().contains("PORTAL_TICK_MS"));
        assert!(err.to_string().contains("soon"));
    }
}
