//! HTTP plumbing between the reporters and the portal.

use crate::build_info::USER_AGENT;
use crate::error::PortalError;
use crate::endpoints::Method;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Header carrying the reporter session, so the portal can tell restarts apart.
pub const SESSION_HEADER: &str = "X-Portal-Session";

pub trait Transport: Send {
    /// POST `body` as JSON, or an empty POST when `body` is `None`.
    fn post_json(&self, url: &str, body: Option<&Value>) -> Result<(), PortalError>;

    fn get_json(&self, url: &str) -> Result<Value, PortalError>;
}

/// Real HTTP via a shared `ureq` agent.
pub struct HttpTransport {
    agent: ureq::Agent,
    session: Uuid,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            session: Uuid::new_v4(),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: Option<&Value>) -> Result<(), PortalError> {
        let request = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .set(SESSION_HEADER, &self.session.to_string());

        match body {
            Some(body) => request.send_json(body)?,
            None => request.call()?,
        };
        Ok(())
    }

    fn get_json(&self, url: &str) -> Result<Value, PortalError> {
        let response = self
            .agent
            .get(url)
            .set(SESSION_HEADER, &self.session.to_string())
            .call()?;

        response
            .into_json::<Value>()
            .map_err(|e| PortalError::BadResponse {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

/// One request seen by a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MemoryState {
    requests: Vec<RecordedRequest>,
    responses: HashMap<String, Value>,
    failing: HashSet<String>,
    fail_all: bool,
}

/// In-memory transport that records every request.
///
/// Clones share state, so a test can keep one handle while the service
/// owns another. Failed requests are recorded too.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Canned body for GET requests to `url`.
    pub fn respond_with(&self, url: &str, body: Value) {
        self.state().responses.insert(url.to_string(), body);
    }

    /// Make every request to `url` fail with a transport error.
    pub fn fail_url(&self, url: &str) {
        self.state().failing.insert(url.to_string());
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.state().fail_all = fail;
    }

    pub fn heal(&self) {
        let mut state = self.state();
        state.fail_all = false;
        state.failing.clear();
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Requests whose URL ends with `path`.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.url.ends_with(path))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.state().requests.clear();
    }

    fn record(&self, method: Method, url: &str, body: Option<&Value>) -> Result<(), PortalError> {
        let mut state = self.state();
        state.requests.push(RecordedRequest {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });
        if state.fail_all || state.failing.contains(url) {
            return Err(PortalError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

impl Transport for MemoryTransport {
    fn post_json(&self, url: &str, body: Option<&Value>) -> Result<(), PortalError> {
        self.record(Method::Post, url, body)
    }

    fn get_json(&self, url: &str) -> Result<Value, PortalError> {
        self.record(Method::Get, url, None)?;
        self.state()
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| PortalError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_transport_records_posts() {
        let transport = MemoryTransport::new();
        transport
            .post_json("http://p/player/update", Some(&json!({"gold": 1})))
            .unwrap();
        transport.post_json("http://p/game/reset", None).unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].body, Some(json!({"gold": 1})));
        assert_eq!(requests[1].body, None);
        assert_eq!(transport.requests_to("/game/reset").len(), 1);
    }

    #[test]
    fn test_clones_share_recorded_requests() {
        let transport = MemoryTransport::new();
        let handle = transport.clone();
        transport.post_json("http://p/a", None).unwrap();
        assert_eq!(handle.requests().len(), 1);
        handle.clear();
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_failures_are_recorded_and_reported() {
        let transport = MemoryTransport::new();
        transport.fail_url("http://p/a");
        assert!(transport.post_json("http://p/a", None).is_err());
        assert!(transport.post_json("http://p/b", None).is_ok());
        assert_eq!(transport.requests().len(), 2);

        transport.set_fail_all(true);
        assert!(transport.post_json("http://p/b", None).is_err());
        transport.heal();
        assert!(transport.post_json("http://p/a", None).is_ok());
    }

    #[test]
    fn test_get_returns_canned_response_or_404() {
        let transport = MemoryTransport::new();
        transport.respond_with("http://p/monsties/new", json!({"pod-names": []}));

        assert_eq!(
            transport.get_json("http://p/monsties/new").unwrap(),
            json!({"pod-names": []})
        );
        assert!(matches!(
            transport.get_json("http://p/other"),
            Err(PortalError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn test_http_transport_has_session() {
        let a = HttpTransport::new(Duration::from_millis(100));
        let b = HttpTransport::new(Duration::from_millis(100));
        assert_ne!(a.session(), b.session());
    }

    #[test]
    fn test_http_transport_reports_connection_failure() {
        // Port 9 on localhost is the discard service; nothing listens there in CI
        let transport = HttpTransport::new(Duration::from_millis(200));
        let err = transport
            .post_json("http://127.0.0.1:9/player/update", Some(&json!({})))
            .unwrap_err();
        assert!(matches!(err, PortalError::Transport { .. }));
    }
}
