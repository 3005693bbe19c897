//! Session actor message types.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::game::{entities::ConnectionId, states::PhaseKind};
use crate::net::messages::{ClientMessage, ServerMessage};

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// A connection opened; `outbox` carries messages back to it.
    Connect {
        connection: ConnectionId,
        outbox: mpsc::Sender<ServerMessage>,
    },

    /// A decoded client message
    Inbound {
        connection: ConnectionId,
        message: ClientMessage,
    },

    /// A connection closed, cleanly or not
    Disconnect { connection: ConnectionId },

    /// Snapshot of live rooms
    ListRooms {
        response: oneshot::Sender<Vec<RoomSummary>>,
    },

    Stats {
        response: oneshot::Sender<SessionStats>,
    },

    /// Stop the actor loop
    Shutdown,
}

/// Room listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub phase: PhaseKind,
}

/// Session-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub rooms: usize,
    pub connections: usize,
    pub players: usize,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session actor is closed")]
    Closed,
}
