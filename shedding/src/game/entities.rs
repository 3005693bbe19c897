use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt};
use uuid::Uuid;

use super::deck::{Card, Value};

/// Identifies one client connection. The transport owns the connection
/// itself; rooms only hold this id to address messages to it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Room names are plain strings chosen by clients.
pub type RoomName = String;

/// Player name. Matching is exact and case-sensitive.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for Username {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Classification of a play. Only the number of cards matters; ranks are
/// never compared against the previous play.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum PlayType {
    Single,
    Pair,
    #[serde(rename = "Regular Bomb")]
    RegularBomb,
    #[serde(rename = "Ultra Bomb")]
    UltraBomb,
    Other,
}

impl PlayType {
    #[must_use]
    pub fn classify(cards: &[Value]) -> Self {
        match cards.len() {
            1 => Self::Single,
            2 => Self::Pair,
            3 => Self::RegularBomb,
            4 => Self::UltraBomb,
            _ => Self::Other,
        }
    }

    pub fn is_bomb(&self) -> bool {
        matches!(self, Self::RegularBomb | Self::UltraBomb)
    }
}

impl fmt::Display for PlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Single => "Single",
            Self::Pair => "Pair",
            Self::RegularBomb => "Regular Bomb",
            Self::UltraBomb => "Ultra Bomb",
            Self::Other => "Other",
        };
        write!(f, "{repr}")
    }
}

/// The open combination on the table: the literal cards submitted and
/// their size classification.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Play {
    pub cards: Vec<Value>,
    #[serde(rename = "type")]
    pub kind: PlayType,
}

impl Play {
    #[must_use]
    pub fn new(cards: Vec<Value>) -> Self {
        let kind = PlayType::classify(&cards);
        Self { cards, kind }
    }
}

/// One entry of the played-cards log kept since the last combination reset.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayedCards {
    pub name: Username,
    pub cards: Vec<Value>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Player {
    pub connection: ConnectionId,
    pub name: Username,
    pub hand: Vec<Card>,
    pub finished: bool,
}

impl Player {
    #[must_use]
    pub fn new(connection: ConnectionId, name: Username) -> Self {
        Self {
            connection,
            name,
            hand: Vec::new(),
            finished: false,
        }
    }

    pub fn cards_left(&self) -> usize {
        self.hand.len()
    }

    /// Remove one card per submitted value, matching the first card with
    /// that value. Values the player doesn't hold are skipped. Returns the
    /// cards actually removed.
    pub fn remove_cards(&mut self, values: &[Value]) -> Vec<Card> {
        let mut removed = Vec::with_capacity(values.len());
        for value in values {
            if let Some(idx) = self.hand.iter().position(|card| card.value == *value) {
                removed.push(self.hand.remove(idx));
            }
        }
        removed
    }

    /// Add cards to the hand and put the player back into play.
    pub fn collect(&mut self, values: &[Value]) {
        self.hand.extend(values.iter().copied().map(Card::new));
        self.finished = false;
    }
}

/// Public view of a player. Hands are visible to everyone in the room.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    pub name: Username,
    pub hand: Vec<Card>,
    pub finished: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            hand: player.hand.clone(),
            finished: player.finished,
        }
    }
}
