//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; those records are
//! forwarded into the tracing subscriber so everything lands in one stream.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the RUST_LOG env var.
///
/// # Example
///
/// ```no_run
/// use sh_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shedding=info,tower_http=warn"));

    // Console layer for development
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a client message the server refused
///
/// # Arguments
///
/// * `connection` - Connection the message came from
/// * `reason` - Short reason code (e.g. `rate_limited`, `invalid_format`)
/// * `detail` - Human readable detail
pub fn log_rejected_message(connection: &str, reason: &str, detail: &str) {
    tracing::warn!(
        connection = connection,
        reason = reason,
        "Rejected client message: {}",
        detail
    );
}

/// Log a WebSocket connection lifecycle event
pub fn log_connection_event(connection: &str, event: &str, open_connections: u64) {
    tracing::info!(
        connection = connection,
        event = event,
        open_connections = open_connections,
        "WebSocket {}",
        event
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_rejected_message() {
        // Just ensure it doesn't panic
        log_rejected_message("conn-1", "rate_limited", "burst limit exceeded");
    }

    #[test]
    fn test_log_connection_event() {
        log_connection_event("conn-1", "connected", 1);
        log_connection_event("conn-1", "disconnected", 0);
    }
}
