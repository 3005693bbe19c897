//! Room configuration models.

use serde::{Deserialize, Serialize};

use crate::game::{
    RoomSettings,
    constants::{MAX_PLAYERS, MIN_PLAYERS},
};

/// Room configuration shared by every room the session creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Seats per room (default: 5)
    pub max_players: usize,

    /// Players needed before ready signals count (default: 2)
    pub min_players: usize,

    /// Session actor inbox capacity
    pub inbox_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            min_players: MIN_PLAYERS,
            inbox_capacity: 256,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_players < 2 {
            return Err("Min players must be at least 2".to_string());
        }

        if self.max_players < self.min_players || self.max_players > MAX_PLAYERS {
            return Err(format!(
                "Max players must be between {} and {MAX_PLAYERS}",
                self.min_players
            ));
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be positive".to_string());
        }

        Ok(())
    }

    pub fn settings(&self) -> RoomSettings {
        RoomSettings {
            max_players: self.max_players,
            min_players: self.min_players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RoomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings(), RoomSettings::default());
    }

    #[test]
    fn test_validate_rejects_bad_seat_counts() {
        let config = RoomConfig {
            min_players: 1,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RoomConfig {
            max_players: 6,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RoomConfig {
            max_players: 3,
            min_players: 4,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RoomConfig {
            max_players: 3,
            min_players: 3,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_inbox() {
        let config = RoomConfig {
            inbox_capacity: 0,
            ..RoomConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
