//! Room lifecycle states.
//!
//! Each state carries only the data that is valid while the room is in it.
//! Turn order, the turn pointer, and combination tracking exist only once a
//! game is in progress.

use serde::{Deserialize, Serialize};

use crate::game::entities::{Play, PlayedCards, Username};

/// Lobby state - accepting joins and collecting ready signals.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Lobby {
    /// Ready signals received since the room was created. Counts signals,
    /// not distinct players.
    pub(crate) ready_count: usize,
}

impl Lobby {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready_count(&self) -> usize {
        self.ready_count
    }
}

/// A game in progress.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InProgress {
    /// Turn order by player name, fixed at game start.
    pub(crate) order: Vec<Username>,
    pub(crate) current_idx: usize,
    pub(crate) played_cards: Vec<PlayedCards>,
    pub(crate) rankings: Vec<Username>,
    /// The open combination. `None` once everyone passed on it.
    pub(crate) previous_play: Option<Play>,
    pub(crate) last_player_who_played: Option<Username>,
    pub(crate) pass_count: usize,
}

impl InProgress {
    #[must_use]
    pub fn new(order: Vec<Username>) -> Self {
        Self {
            order,
            current_idx: 0,
            played_cards: Vec::new(),
            rankings: Vec::new(),
            previous_play: None,
            last_player_who_played: None,
            pass_count: 0,
        }
    }

    pub fn order(&self) -> &[Username] {
        &self.order
    }

    pub fn current_player(&self) -> Option<&Username> {
        self.order.get(self.current_idx)
    }

    /// The player seated after the current one in turn order, finished or not.
    pub fn next_player(&self) -> Option<&Username> {
        if self.order.is_empty() {
            return None;
        }
        self.order.get((self.current_idx + 1) % self.order.len())
    }

    pub fn played_cards(&self) -> &[PlayedCards] {
        &self.played_cards
    }

    pub fn rankings(&self) -> &[Username] {
        &self.rankings
    }

    pub fn previous_play(&self) -> Option<&Play> {
        self.previous_play.as_ref()
    }

    pub fn last_player_who_played(&self) -> Option<&Username> {
        self.last_player_who_played.as_ref()
    }

    pub fn pass_count(&self) -> usize {
        self.pass_count
    }

    /// Rank a player unless they already hold a place.
    pub(crate) fn rank(&mut self, name: &Username) {
        if !self.rankings.contains(name) {
            self.rankings.push(name.clone());
        }
    }

    /// Drop the open combination and everything played on it.
    pub(crate) fn clear_combination(&mut self) {
        self.previous_play = None;
        self.played_cards.clear();
        self.pass_count = 0;
    }
}

/// Game over. The room is torn down right after entering this state.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ended {
    pub(crate) rankings: Vec<Username>,
}

impl Ended {
    pub fn rankings(&self) -> &[Username] {
        &self.rankings
    }
}

/// Coarse phase name used in room listings.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Lobby,
    InProgress,
    Ended,
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseKind::Lobby => write!(f, "lobby"),
            PhaseKind::InProgress => write!(f, "in_progress"),
            PhaseKind::Ended => write!(f, "ended"),
        }
    }
}
