//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use shedding::{MAX_PLAYERS, room::RoomConfig};
use std::net::SocketAddr;

use crate::api::rate_limiter::ConnectionLimits;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Room defaults shared by every room
    pub rooms: RoomConfig,
    /// Per-connection WebSocket limits
    pub limits: ConnectionLimits,
    /// Prometheus listener, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if an address variable is set but unparseable
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr_env("SERVER_BIND")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080))),
        };

        let metrics_bind = match metrics_override {
            Some(addr) => Some(addr),
            None => parse_addr_env("METRICS_BIND")?,
        };

        let defaults = RoomConfig::default();
        let rooms = RoomConfig {
            max_players: parse_env_or("ROOM_MAX_PLAYERS", defaults.max_players),
            min_players: parse_env_or("ROOM_MIN_PLAYERS", defaults.min_players),
            inbox_capacity: parse_env_or("SESSION_INBOX_CAPACITY", defaults.inbox_capacity),
        };

        let default_limits = ConnectionLimits::default();
        let limits = ConnectionLimits {
            burst: parse_env_or("WS_BURST_LIMIT", default_limits.burst),
            sustained: parse_env_or("WS_SUSTAINED_LIMIT", default_limits.sustained),
            outbound_buffer: parse_env_or("WS_OUTBOUND_BUFFER", default_limits.outbound_buffer),
        };

        Ok(ServerConfig {
            bind,
            rooms,
            limits,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rooms.min_players < 2 {
            return Err(ConfigError::Invalid {
                var: "ROOM_MIN_PLAYERS".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }

        if self.rooms.max_players < self.rooms.min_players {
            return Err(ConfigError::Invalid {
                var: "ROOM_MAX_PLAYERS".to_string(),
                reason: format!(
                    "Must be at least min players ({})",
                    self.rooms.min_players
                ),
            });
        }

        if self.rooms.max_players > MAX_PLAYERS {
            return Err(ConfigError::Invalid {
                var: "ROOM_MAX_PLAYERS".to_string(),
                reason: format!("Must be at most {MAX_PLAYERS}"),
            });
        }

        if self.rooms.inbox_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "SESSION_INBOX_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.limits.burst == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_BURST_LIMIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.limits.sustained < self.limits.burst {
            return Err(ConfigError::Invalid {
                var: "WS_SUSTAINED_LIMIT".to_string(),
                reason: format!("Must be at least the burst limit ({})", self.limits.burst),
            });
        }

        if self.limits.outbound_buffer == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_OUTBOUND_BUFFER".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Addresses are not silently defaulted: a set but malformed value is an error.
fn parse_addr_env(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("{value:?} is not an IP:PORT address ({e})"),
            }),
        Err(_) => Ok(None),
    }
}
