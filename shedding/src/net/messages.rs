use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::{
    RoomError,
    deck::{Card, Value},
    entities::{ConnectionId, PlayedCards, PlayerView, RoomName, Username},
};

/// A message from a client to the server. Every message after `join` names
/// the room it targets.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Join a room, creating it if needed.
    Join {
        room: RoomName,
        player_name: Username,
    },
    /// Signal readiness to start. The game starts once there are as many
    /// signals as seated players.
    Ready { room: RoomName },
    /// Put cards on the table. Only valid on the sender's turn.
    PlayTurn { room: RoomName, cards: Vec<Value> },
    /// Decline to beat the open combination. Only valid on the sender's turn.
    PassTurn { room: RoomName },
    /// Add bomb cards to a named player's hand.
    CollectBomb {
        room: RoomName,
        player_name: Username,
        bomb_cards: Vec<Value>,
    },
    Leave { room: RoomName },
    /// Any `type` this server doesn't know.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Wire name of the message type, for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Ready { .. } => "ready",
            Self::PlayTurn { .. } => "play_turn",
            Self::PassTurn { .. } => "pass_turn",
            Self::CollectBomb { .. } => "collect_bomb",
            Self::Leave { .. } => "leave",
            Self::Unknown => "unknown",
        }
    }

    /// The room this message targets, if it names one.
    pub fn room(&self) -> Option<&str> {
        match self {
            Self::Join { room, .. }
            | Self::Ready { room }
            | Self::PlayTurn { room, .. }
            | Self::PassTurn { room }
            | Self::CollectBomb { room, .. }
            | Self::Leave { room } => Some(room),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join { room, player_name } => write!(f, "{player_name} joins {room}"),
            Self::PlayTurn { room, cards } => write!(f, "play {} card(s) in {room}", cards.len()),
            Self::CollectBomb {
                room,
                player_name,
                bomb_cards,
            } => write!(
                f,
                "{player_name} collects {} card(s) in {room}",
                bomb_cards.len()
            ),
            Self::Unknown => write!(f, "unknown message"),
            other => match other.room() {
                Some(room) => write!(f, "{} in {room}", other.kind()),
                None => write!(f, "{}", other.kind()),
            },
        }
    }
}

/// A message from the server to a client.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Current roster, sent to everyone in the room after a join.
    RoomJoined { players: Vec<PlayerView> },
    /// The sender's last message was rejected.
    Error { message: String },
    /// Sent to each player individually with their own hand.
    StartGame {
        deck: Vec<Card>,
        order: Vec<Username>,
        current_player: Username,
    },
    UpdateCards {
        player_name: Username,
        cards_left: usize,
    },
    /// Table state after the turn moved.
    PlayerMove {
        players: Vec<PlayerView>,
        played_cards: Vec<PlayedCards>,
        current_player: Username,
        next_player: Username,
    },
    PlayerLeft { message: String },
    GameOver { rankings: Vec<Username> },
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoomJoined { .. } => "room_joined",
            Self::Error { .. } => "error",
            Self::StartGame { .. } => "start_game",
            Self::UpdateCards { .. } => "update_cards",
            Self::PlayerMove { .. } => "player_move",
            Self::PlayerLeft { .. } => "player_left",
            Self::GameOver { .. } => "game_over",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

impl From<RoomError> for ServerMessage {
    fn from(error: RoomError) -> Self {
        Self::error(error.to_string())
    }
}

/// A server message addressed to one connection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub message: ServerMessage,
}

impl Delivery {
    #[must_use]
    pub fn new(to: ConnectionId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}
