//! Prometheus metrics for monitoring server health and traffic.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! when `METRICS_BIND` is set. Without an installed exporter every call here
//! is a no-op.
//!
//! # Metrics Categories
//!
//! - **WebSocket Metrics**: Active connections, messages sent/received
//! - **Protocol Metrics**: Inbound messages by type, rejected messages
//! - **Rate Limiting Metrics**: Frames dropped by the per-connection limiter
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sh_server::metrics;
//! use std::net::SocketAddr;
//!
//! // Initialize metrics exporter
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! // Record an inbound message
//! metrics::messages_received_total("play_turn");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: u64) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent(kind: &'static str) {
    metrics::counter!("websocket_messages_sent", "type" => kind).increment(1);
}

// ============================================================================
// Protocol Metrics
// ============================================================================

/// Increment decoded inbound message counter, labelled by message type.
pub fn messages_received_total(kind: &'static str) {
    metrics::counter!("messages_received_total", "type" => kind).increment(1);
}

/// Increment rejected message counter.
///
/// `reason` is `invalid_format`, `too_large`, or `room_error`.
pub fn messages_rejected_total(reason: &'static str) {
    metrics::counter!("messages_rejected_total", "reason" => reason).increment(1);
}

/// Record outbound frame size in bytes.
pub fn outbound_frame_bytes(size: usize) {
    metrics::histogram!("outbound_frame_bytes").record(size as f64);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(window: &'static str) {
    metrics::counter!("rate_limit_hits_total", "window" => window).increment(1);
}
