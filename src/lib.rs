//! Brogue Portal - gameplay telemetry for a Brogue fork
//!
//! Copies live game state out of the engine once per tick, posts whatever
//! changed to the portal collector as JSON, and serves Prometheus gauges
//! from an embedded HTTP server.

pub mod build_info;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod items;
pub mod metrics;
pub mod payload;
pub mod reporters;
pub mod service;
pub mod simulator;
pub mod snapshot;
pub mod tracker;
pub mod transport;

pub use client::PortalClient;
pub use config::PortalConfig;
pub use error::{ConfigError, PortalError};
pub use service::{ServiceHandle, TelemetryService, TickSummary};
pub use snapshot::{GameSnapshot, GameSource};
pub use transport::{HttpTransport, MemoryTransport, Transport};
