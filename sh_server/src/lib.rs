//! Shedding game server library.
//!
//! Hosts the HTTP/WebSocket API, configuration, logging, and metrics for
//! the `sh_server` binary. Exposed as a library so integration tests can
//! build the router directly.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
