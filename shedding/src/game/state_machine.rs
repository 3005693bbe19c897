//! Room state machine.
//!
//! A [`Room`] owns its players, its deck, and its lifecycle [`RoomPhase`].
//! Every operation validates against the current phase, mutates the room,
//! and queues the resulting [`Delivery`]s in the room's outbox. Rejected
//! operations return a [`RoomError`] and leave the room untouched.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};
use thiserror::Error;

use super::constants::{MAX_PLAYERS, MIN_PLAYERS};
use super::deck::{self, Card, Value};
use super::entities::{
    ConnectionId, Play, PlayedCards, Player, PlayerView, RoomName, Username,
};
use super::states::{Ended, InProgress, Lobby, PhaseKind};
use crate::net::messages::{Delivery, ServerMessage};

/// Turn-bound actions, used to word the out-of-turn error.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TurnAction {
    Play,
    Pass,
}

impl fmt::Display for TurnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Play => write!(f, "play"),
            Self::Pass => write!(f, "pass"),
        }
    }
}

/// Errors reported to the connection that sent the offending message.
///
/// The `Display` output is the exact `message` sent on the wire.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum RoomError {
    #[error("room_full")]
    RoomFull,
    #[error("duplicate_name")]
    DuplicateName,
    #[error("game_in_progress")]
    GameInProgress,
    #[error("already_in_room")]
    AlreadyInRoom,
    #[error("It is not your turn to {0}.")]
    NotYourTurn(TurnAction),
    #[error("Player not found in room.")]
    PlayerNotFound,
    #[error("Room not found.")]
    RoomNotFound,
    #[error("Unknown message type.")]
    UnknownMessageType,
    #[error("Invalid message format.")]
    InvalidMessage,
}

/// Why a player is being removed from a room.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Departure {
    Left,
    Disconnected,
}

/// Seating limits for a room.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoomSettings {
    pub max_players: usize,
    pub min_players: usize,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            min_players: MIN_PLAYERS,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoomPhase {
    Lobby(Lobby),
    InProgress(InProgress),
    Ended(Ended),
}

impl RoomPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::Lobby(_) => PhaseKind::Lobby,
            Self::InProgress(_) => PhaseKind::InProgress,
            Self::Ended(_) => PhaseKind::Ended,
        }
    }
}

/// Whether a turn left the game running.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TurnOutcome {
    Continue,
    GameOver,
}

#[derive(Debug)]
pub struct Room {
    name: RoomName,
    settings: RoomSettings,
    players: Vec<Player>,
    /// Shuffled once at creation and dealt from at game start.
    deck: Vec<Card>,
    phase: RoomPhase,
    outbox: VecDeque<Delivery>,
}

impl Room {
    #[must_use]
    pub fn new(name: &str, settings: RoomSettings) -> Self {
        Self::with_deck(name, settings, deck::create_deck())
    }

    #[must_use]
    pub fn with_deck(name: &str, settings: RoomSettings, deck: Vec<Card>) -> Self {
        Self {
            name: name.to_string(),
            settings,
            players: Vec::with_capacity(settings.max_players),
            deck,
            phase: RoomPhase::Lobby(Lobby::new()),
            outbox: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> RoomSettings {
        self.settings
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name.as_str() == name)
    }

    pub fn player_by_connection(&self, connection: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.connection == connection)
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn phase(&self) -> &RoomPhase {
        &self.phase
    }

    /// Game data, if a game is running.
    pub fn game(&self) -> Option<&InProgress> {
        match &self.phase {
            RoomPhase::InProgress(game) => Some(game),
            _ => None,
        }
    }

    /// A room is closed once its game is over or its last player is gone.
    pub fn is_closed(&self) -> bool {
        matches!(self.phase, RoomPhase::Ended(_)) || self.players.is_empty()
    }

    /// Take every message queued since the last drain.
    pub fn drain_outbox(&mut self) -> VecDeque<Delivery> {
        std::mem::take(&mut self.outbox)
    }

    pub fn join(&mut self, connection: ConnectionId, name: Username) -> Result<(), RoomError> {
        if !matches!(self.phase, RoomPhase::Lobby(_)) {
            return Err(RoomError::GameInProgress);
        }
        if self.players.len() >= self.settings.max_players {
            return Err(RoomError::RoomFull);
        }
        if self.players.iter().any(|p| p.name == name) {
            return Err(RoomError::DuplicateName);
        }

        info!("{name} joined room {}", self.name);
        self.players.push(Player::new(connection, name));
        let players = self.roster();
        broadcast(&self.players, &mut self.outbox, ServerMessage::RoomJoined { players });
        Ok(())
    }

    /// Register a ready signal. Signals are ignored until enough players are
    /// seated, and after the game has started.
    pub fn ready(&mut self) {
        let player_count = self.players.len();
        let RoomPhase::Lobby(lobby) = &mut self.phase else {
            debug!("room {}: ready ignored, game already started", self.name);
            return;
        };
        if player_count < self.settings.min_players {
            debug!(
                "room {}: ready ignored with {player_count} player(s)",
                self.name
            );
            return;
        }

        lobby.ready_count += 1;
        if lobby.ready_count >= player_count {
            self.start_game();
        }
    }

    pub fn play_turn(
        &mut self,
        connection: ConnectionId,
        cards: Vec<Value>,
    ) -> Result<(), RoomError> {
        let RoomPhase::InProgress(game) = &mut self.phase else {
            return Err(RoomError::NotYourTurn(TurnAction::Play));
        };
        let outcome = game.play(&mut self.players, &mut self.outbox, connection, cards)?;
        if outcome == TurnOutcome::GameOver {
            self.end_game();
        }
        Ok(())
    }

    pub fn pass_turn(&mut self, connection: ConnectionId) -> Result<(), RoomError> {
        let RoomPhase::InProgress(game) = &mut self.phase else {
            return Err(RoomError::NotYourTurn(TurnAction::Pass));
        };
        let outcome = game.pass(&self.players, &mut self.outbox, connection)?;
        if outcome == TurnOutcome::GameOver {
            self.end_game();
        }
        Ok(())
    }

    /// Add cards to a player's hand and put them back into play. Works in any
    /// phase and for any caller; there is no turn or identity check.
    pub fn collect_bomb(&mut self, name: &str, cards: &[Value]) -> Result<(), RoomError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.name.as_str() == name)
            .ok_or(RoomError::PlayerNotFound)?;
        player.collect(cards);

        let message = ServerMessage::UpdateCards {
            player_name: player.name.clone(),
            cards_left: player.cards_left(),
        };
        debug!(
            "room {}: {} collected {} card(s)",
            self.name,
            player.name,
            cards.len()
        );
        broadcast(&self.players, &mut self.outbox, message);
        Ok(())
    }

    /// Remove the player bound to `connection`, if any, and tell everyone
    /// left behind. A player leaving mid-game is dropped from the turn order
    /// too.
    pub fn remove_connection(
        &mut self,
        connection: ConnectionId,
        departure: Departure,
    ) -> Option<Username> {
        let idx = self.players.iter().position(|p| p.connection == connection)?;
        let player = self.players.remove(idx);

        let message = match departure {
            Departure::Left => format!("{} has left the room.", player.name),
            Departure::Disconnected => format!("{} has disconnected.", player.name),
        };
        info!("room {}: {message}", self.name);
        broadcast(&self.players, &mut self.outbox, ServerMessage::PlayerLeft { message });

        if let RoomPhase::InProgress(game) = &mut self.phase {
            let outcome = game.remove_player(&player.name, &self.players, &mut self.outbox);
            if outcome == TurnOutcome::GameOver {
                self.end_game();
            }
        }
        Some(player.name)
    }

    fn roster(&self) -> Vec<PlayerView> {
        self.players.iter().map(PlayerView::from).collect()
    }

    /// Split the deck into equal contiguous chunks in join order, then hand
    /// out the remainder one card at a time.
    fn deal(&mut self) {
        let count = self.players.len();
        if count == 0 {
            return;
        }
        let per_player = self.deck.len() / count;
        let mut cards = self.deck.iter().copied();
        for player in &mut self.players {
            player.hand = cards.by_ref().take(per_player).collect();
            player.finished = false;
        }
        for (idx, card) in cards.enumerate() {
            self.players[idx % count].hand.push(card);
        }
    }

    fn start_game(&mut self) {
        self.deal();

        let mut order: Vec<Username> = self.players.iter().map(|p| p.name.clone()).collect();
        deck::shuffle_array(&mut order, &mut rand::rng());
        let game = InProgress::new(order);

        if let Some(current) = game.current_player() {
            for player in &self.players {
                self.outbox.push_back(Delivery::new(
                    player.connection,
                    ServerMessage::StartGame {
                        deck: player.hand.clone(),
                        order: game.order.clone(),
                        current_player: current.clone(),
                    },
                ));
            }
            info!(
                "room {}: game started with {} players, {current} leads",
                self.name,
                self.players.len()
            );
        }
        self.phase = RoomPhase::InProgress(game);
    }

    fn end_game(&mut self) {
        let rankings = match std::mem::take(&mut self.phase) {
            RoomPhase::InProgress(game) => game.rankings,
            RoomPhase::Ended(ended) => ended.rankings,
            RoomPhase::Lobby(_) => Vec::new(),
        };
        info!("room {}: game over, rankings {rankings:?}", self.name);
        broadcast(
            &self.players,
            &mut self.outbox,
            ServerMessage::GameOver {
                rankings: rankings.clone(),
            },
        );
        self.phase = RoomPhase::Ended(Ended { rankings });
    }
}

impl Default for RoomPhase {
    fn default() -> Self {
        Self::Ended(Ended::default())
    }
}

fn broadcast(players: &[Player], outbox: &mut VecDeque<Delivery>, message: ServerMessage) {
    for player in players {
        outbox.push_back(Delivery::new(player.connection, message.clone()));
    }
}

fn is_active(players: &[Player], name: &Username) -> bool {
    players.iter().any(|p| &p.name == name && !p.finished)
}

impl InProgress {
    /// Index into `players` of the player allowed to act, if `connection`
    /// holds the turn.
    fn acting_player(&self, players: &[Player], connection: ConnectionId) -> Option<usize> {
        let current = self.current_player()?;
        players
            .iter()
            .position(|p| &p.name == current && p.connection == connection)
    }

    fn play(
        &mut self,
        players: &mut [Player],
        outbox: &mut VecDeque<Delivery>,
        connection: ConnectionId,
        cards: Vec<Value>,
    ) -> Result<TurnOutcome, RoomError> {
        let idx = self
            .acting_player(players, connection)
            .ok_or(RoomError::NotYourTurn(TurnAction::Play))?;
        let name = players[idx].name.clone();

        let play = Play::new(cards.clone());
        if play.kind.is_bomb() {
            info!("{name} dropped a {} ({} cards)", play.kind, play.cards.len());
        } else {
            debug!("{name} played a {}", play.kind);
        }
        self.previous_play = Some(play);
        self.last_player_who_played = Some(name.clone());
        self.pass_count = 0;

        players[idx].remove_cards(&cards);
        self.played_cards.push(PlayedCards {
            name: name.clone(),
            cards,
        });

        let cards_left = players[idx].cards_left();
        broadcast(
            players,
            outbox,
            ServerMessage::UpdateCards {
                player_name: name.clone(),
                cards_left,
            },
        );

        if cards_left == 0 {
            players[idx].finished = true;
            self.rank(&name);
            debug!("{name} finished in place {}", self.rankings.len());

            let others = players
                .iter()
                .filter(|p| !p.finished && p.name != name)
                .count();
            if self.pass_count == others {
                self.clear_combination();
                return Ok(self.advance(players, outbox));
            }
        }

        let remaining: Vec<&Username> = players
            .iter()
            .filter(|p| !p.finished)
            .map(|p| &p.name)
            .collect();
        if remaining.len() <= 1 {
            if let Some(last) = remaining.first().copied().cloned() {
                self.rank(&last);
            }
            return Ok(TurnOutcome::GameOver);
        }

        Ok(self.advance(players, outbox))
    }

    fn pass(
        &mut self,
        players: &[Player],
        outbox: &mut VecDeque<Delivery>,
        connection: ConnectionId,
    ) -> Result<TurnOutcome, RoomError> {
        self.acting_player(players, connection)
            .ok_or(RoomError::NotYourTurn(TurnAction::Pass))?;

        self.pass_count += 1;
        if self.everyone_passed(players) {
            debug!("all {} eligible player(s) passed, combination cleared", self.pass_count);
            self.clear_combination();
        }

        Ok(self.advance(players, outbox))
    }

    /// Whether every unfinished player other than the last one to play has
    /// passed on the open combination. Compared with `>=` because a player
    /// who passed may have left since.
    fn everyone_passed(&self, players: &[Player]) -> bool {
        let eligible = players
            .iter()
            .filter(|p| !p.finished && Some(&p.name) != self.last_player_who_played.as_ref())
            .count();
        self.pass_count >= eligible
    }

    /// Index into `order` of the first unfinished player after the current one.
    fn next_active(&self, players: &[Player]) -> Option<usize> {
        let len = self.order.len();
        (1..=len)
            .map(|step| (self.current_idx + step) % len)
            .find(|&idx| is_active(players, &self.order[idx]))
    }

    /// Move the turn to the next player in order who hasn't finished and
    /// broadcast the new table state. Ends the game when nobody is left to
    /// take a turn.
    fn advance(&mut self, players: &[Player], outbox: &mut VecDeque<Delivery>) -> TurnOutcome {
        let Some(idx) = self.next_active(players) else {
            return TurnOutcome::GameOver;
        };
        self.current_idx = idx;

        let (Some(current), Some(next)) = (self.current_player(), self.next_player()) else {
            return TurnOutcome::GameOver;
        };
        broadcast(
            players,
            outbox,
            ServerMessage::PlayerMove {
                players: players.iter().map(PlayerView::from).collect(),
                played_cards: self.played_cards.clone(),
                current_player: current.clone(),
                next_player: next.clone(),
            },
        );
        TurnOutcome::Continue
    }

    /// Drop a departed player from the turn order, keeping the turn pointer
    /// on the same logical player.
    fn remove_player(
        &mut self,
        name: &Username,
        players: &[Player],
        outbox: &mut VecDeque<Delivery>,
    ) -> TurnOutcome {
        let Some(pos) = self.order.iter().position(|n| n == name) else {
            return TurnOutcome::Continue;
        };
        self.order.remove(pos);

        let remaining: Vec<&Username> = players
            .iter()
            .filter(|p| !p.finished)
            .map(|p| &p.name)
            .collect();
        if remaining.len() <= 1 {
            if let Some(last) = remaining.first().copied().cloned() {
                self.rank(&last);
            }
            return TurnOutcome::GameOver;
        }

        let len = self.order.len();
        if pos < self.current_idx {
            self.current_idx -= 1;
            TurnOutcome::Continue
        } else if pos == self.current_idx {
            // The leaver held the turn and had not passed, so every pass
            // counted so far belongs to a player still seated.
            self.current_idx = (pos + len - 1) % len;
            if self.everyone_passed(players) {
                debug!("{name} left as the last to act, combination cleared");
                self.clear_combination();
            }
            self.advance(players, outbox)
        } else {
            TurnOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::DECK_SIZE;
    use std::collections::HashMap;

    fn join(room: &mut Room, name: &str) -> ConnectionId {
        let connection = ConnectionId::new();
        room.join(connection, Username::new(name)).unwrap();
        connection
    }

    /// Room with `names` seated and a started game; outbox drained.
    fn started(names: &[&str]) -> (Room, HashMap<String, ConnectionId>) {
        let mut room = Room::new("R1", RoomSettings::default());
        let connections: HashMap<String, ConnectionId> = names
            .iter()
            .map(|name| (name.to_string(), join(&mut room, name)))
            .collect();
        for _ in names {
            room.ready();
        }
        assert!(room.game().is_some());
        room.drain_outbox();
        (room, connections)
    }

    fn current(room: &Room) -> Username {
        room.game().unwrap().current_player().unwrap().clone()
    }

    fn current_connection(room: &Room) -> ConnectionId {
        room.player(current(room).as_str()).unwrap().connection
    }

    fn first_card(room: &Room, name: &Username) -> Value {
        room.player(name.as_str()).unwrap().hand[0].value
    }

    fn set_hand(room: &mut Room, name: &Username, values: &[Value]) {
        let player = room
            .players
            .iter_mut()
            .find(|p| &p.name == name)
            .unwrap();
        player.hand = values.iter().copied().map(Card::new).collect();
    }

    #[test]
    fn test_join_broadcasts_roster_to_everyone() {
        let mut room = Room::new("R1", RoomSettings::default());
        let a = join(&mut room, "A");
        room.drain_outbox();
        let b = join(&mut room, "B");

        let deliveries: Vec<Delivery> = room.drain_outbox().into_iter().collect();
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].to, a);
        assert_eq!(deliveries[1].to, b);
        match &deliveries[0].message {
            ServerMessage::RoomJoined { players } => {
                let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["A", "B"]);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_sixth_join_is_rejected() {
        let mut room = Room::new("R1", RoomSettings::default());
        for name in ["A", "B", "C", "D", "E"] {
            join(&mut room, name);
        }
        room.drain_outbox();

        let result = room.join(ConnectionId::new(), Username::new("F"));
        assert_eq!(result, Err(RoomError::RoomFull));
        assert_eq!(room.players().len(), 5);
        assert!(room.drain_outbox().is_empty());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut room = Room::new("R1", RoomSettings::default());
        let first = join(&mut room, "A");

        let result = room.join(ConnectionId::new(), Username::new("A"));
        assert_eq!(result, Err(RoomError::DuplicateName));
        assert_eq!(room.players().len(), 1);
        assert_eq!(room.player("A").unwrap().connection, first);

        // Names are case-sensitive.
        assert!(room.join(ConnectionId::new(), Username::new("a")).is_ok());
    }

    #[test]
    fn test_join_after_start_is_rejected() {
        let (mut room, _) = started(&["A", "B"]);
        let result = room.join(ConnectionId::new(), Username::new("C"));
        assert_eq!(result, Err(RoomError::GameInProgress));
    }

    #[test]
    fn test_ready_needs_two_players() {
        let mut room = Room::new("R1", RoomSettings::default());
        join(&mut room, "A");
        room.ready();
        room.ready();
        assert!(matches!(room.phase(), RoomPhase::Lobby(lobby) if lobby.ready_count() == 0));
    }

    #[test]
    fn test_game_starts_when_everyone_is_ready() {
        let mut room = Room::new("R1", RoomSettings::default());
        join(&mut room, "A");
        join(&mut room, "B");
        join(&mut room, "C");
        room.drain_outbox();

        room.ready();
        room.ready();
        assert_eq!(room.phase().kind(), PhaseKind::Lobby);
        room.ready();
        assert_eq!(room.phase().kind(), PhaseKind::InProgress);

        let deliveries: Vec<Delivery> = room.drain_outbox().into_iter().collect();
        assert_eq!(deliveries.len(), 3);
        for delivery in deliveries {
            let player = room.player_by_connection(delivery.to).unwrap();
            match delivery.message {
                ServerMessage::StartGame {
                    deck,
                    order,
                    current_player,
                } => {
                    assert_eq!(deck, player.hand, "each player gets their own hand");
                    assert_eq!(current_player, order[0]);
                    let mut sorted = order.clone();
                    sorted.sort();
                    assert_eq!(
                        sorted,
                        vec![Username::new("A"), Username::new("B"), Username::new("C")]
                    );
                }
                other => panic!("unexpected message {other:?}"),
            }
        }
    }

    #[test]
    fn test_deal_splits_chunks_then_round_robin() {
        let (room, _) = started(&["A", "B", "C", "D", "E"]);
        let sizes: Vec<usize> = room.players().iter().map(Player::cards_left).collect();
        // 54 / 5 = 10 each, remainder 4 to the first four in join order.
        assert_eq!(sizes, vec![11, 11, 11, 11, 10]);

        let deck = room.deck();
        assert_eq!(room.players()[0].hand[..10], deck[..10]);
        assert_eq!(room.players()[1].hand[..10], deck[10..20]);
        assert_eq!(room.players()[0].hand[10], deck[50]);
        assert_eq!(room.players()[3].hand[10], deck[53]);
    }

    #[test]
    fn test_deal_uses_the_whole_deck() {
        for n in 2..=5 {
            let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let (room, _) = started(&refs);

            let mut dealt: Vec<Card> = room
                .players()
                .iter()
                .flat_map(|p| p.hand.iter().copied())
                .collect();
            let mut deck = room.deck().to_vec();
            dealt.sort();
            deck.sort();
            assert_eq!(dealt.len(), DECK_SIZE);
            assert_eq!(dealt, deck);
        }
    }

    #[test]
    fn test_out_of_turn_actions_change_nothing() {
        let (mut room, connections) = started(&["A", "B", "C"]);
        let holder = current(&room);
        let other = connections
            .iter()
            .find(|(name, _)| name.as_str() != holder.as_str())
            .map(|(_, c)| *c)
            .unwrap();

        let before = room.phase().clone();
        let hands: Vec<Vec<Card>> = room.players().iter().map(|p| p.hand.clone()).collect();

        assert_eq!(
            room.play_turn(other, vec![Value::Three]),
            Err(RoomError::NotYourTurn(TurnAction::Play))
        );
        assert_eq!(
            room.pass_turn(other),
            Err(RoomError::NotYourTurn(TurnAction::Pass))
        );
        assert_eq!(room.phase(), &before);
        let after: Vec<Vec<Card>> = room.players().iter().map(|p| p.hand.clone()).collect();
        assert_eq!(hands, after);
        assert!(room.drain_outbox().is_empty());
    }

    #[test]
    fn test_turn_actions_in_lobby_are_rejected() {
        let mut room = Room::new("R1", RoomSettings::default());
        let a = join(&mut room, "A");
        assert_eq!(
            room.play_turn(a, vec![Value::Ace]),
            Err(RoomError::NotYourTurn(TurnAction::Play))
        );
        assert_eq!(
            room.pass_turn(a),
            Err(RoomError::NotYourTurn(TurnAction::Pass))
        );
    }

    #[test]
    fn test_play_records_combination_and_broadcasts_counts() {
        let (mut room, _) = started(&["A", "B", "C"]);
        let leader = current(&room);
        let card = first_card(&room, &leader);
        let before = room.player(leader.as_str()).unwrap().cards_left();

        room.play_turn(current_connection(&room), vec![card]).unwrap();

        let game = room.game().unwrap();
        let play = game.previous_play().unwrap();
        assert_eq!(play.cards, vec![card]);
        assert_eq!(play.kind, crate::game::entities::PlayType::Single);
        assert_eq!(game.last_player_who_played(), Some(&leader));
        assert_eq!(game.pass_count(), 0);
        assert_eq!(game.played_cards().len(), 1);
        assert_eq!(
            room.player(leader.as_str()).unwrap().cards_left(),
            before - 1
        );
        assert_ne!(current(&room), leader);

        let messages: Vec<ServerMessage> =
            room.drain_outbox().into_iter().map(|d| d.message).collect();
        assert_eq!(messages.len(), 6);
        assert!(messages[..3].iter().all(|m| matches!(
            m,
            ServerMessage::UpdateCards { player_name, cards_left }
                if player_name == &leader && *cards_left == before - 1
        )));
        assert!(messages[3..]
            .iter()
            .all(|m| matches!(m, ServerMessage::PlayerMove { .. })));
    }

    #[test]
    fn test_everyone_passing_clears_the_combination() {
        let (mut room, _) = started(&["A", "B", "C"]);
        let leader = current(&room);
        let card = first_card(&room, &leader);
        room.play_turn(current_connection(&room), vec![card]).unwrap();

        room.pass_turn(current_connection(&room)).unwrap();
        assert_eq!(room.game().unwrap().pass_count(), 1);
        assert!(room.game().unwrap().previous_play().is_some());

        room.pass_turn(current_connection(&room)).unwrap();
        let game = room.game().unwrap();
        assert_eq!(game.pass_count(), 0);
        assert!(game.previous_play().is_none());
        assert!(game.played_cards().is_empty());
        assert_eq!(current(&room), leader, "the leader opens the next combination");
    }

    #[test]
    fn test_finishing_ranks_player_once_and_skips_them() {
        let (mut room, _) = started(&["A", "B", "C"]);
        let leader = current(&room);
        set_hand(&mut room, &leader, &[Value::Seven]);

        room.play_turn(current_connection(&room), vec![Value::Seven])
            .unwrap();
        let player = room.player(leader.as_str()).unwrap();
        assert!(player.finished);
        assert_eq!(room.game().unwrap().rankings(), &[leader.clone()]);

        // The two remaining players pass; the finished leader is skipped.
        room.pass_turn(current_connection(&room)).unwrap();
        room.pass_turn(current_connection(&room)).unwrap();
        let game = room.game().unwrap();
        assert!(game.previous_play().is_none());
        assert_ne!(current(&room), leader);
        assert_eq!(game.rankings().len(), 1);
    }

    #[test]
    fn test_last_active_player_ends_the_game() {
        let (mut room, _) = started(&["A", "B"]);
        let leader = current(&room);
        let other = room
            .players()
            .iter()
            .find(|p| p.name != leader)
            .unwrap()
            .name
            .clone();
        set_hand(&mut room, &leader, &[Value::Two, Value::Two]);

        room.play_turn(current_connection(&room), vec![Value::Two, Value::Two])
            .unwrap();

        match room.phase() {
            RoomPhase::Ended(ended) => {
                assert_eq!(ended.rankings(), &[leader.clone(), other.clone()]);
            }
            other => panic!("expected ended phase, got {other:?}"),
        }
        assert!(room.is_closed());
        let game_over: Vec<ServerMessage> = room
            .drain_outbox()
            .into_iter()
            .map(|d| d.message)
            .filter(|m| matches!(m, ServerMessage::GameOver { .. }))
            .collect();
        assert_eq!(game_over.len(), 2);
        assert_eq!(
            game_over[0],
            ServerMessage::GameOver {
                rankings: vec![leader, other]
            }
        );
    }

    #[test]
    fn test_advance_terminates_when_everyone_finished() {
        let (mut room, _) = started(&["A", "B", "C"]);
        let leader = current(&room);
        for player in room.players.iter_mut() {
            if player.name != leader {
                player.finished = true;
            }
        }
        set_hand(&mut room, &leader, &[Value::Ace]);

        room.play_turn(current_connection(&room), vec![Value::Ace])
            .unwrap();
        assert_eq!(room.phase().kind(), PhaseKind::Ended);
    }

    #[test]
    fn test_collect_bomb_unfinishes_player_without_turn_check() {
        let (mut room, _) = started(&["A", "B", "C"]);
        let target = room
            .players()
            .iter()
            .find(|p| p.name != current(&room))
            .unwrap()
            .name
            .clone();
        let before = room.player(target.as_str()).unwrap().cards_left();

        room.collect_bomb(target.as_str(), &[Value::Four; 3])
            .unwrap();
        let player = room.player(target.as_str()).unwrap();
        assert_eq!(player.cards_left(), before + 3);
        assert!(!player.finished);

        let messages: Vec<ServerMessage> =
            room.drain_outbox().into_iter().map(|d| d.message).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| matches!(
            m,
            ServerMessage::UpdateCards { cards_left, .. } if *cards_left == before + 3
        )));
    }

    #[test]
    fn test_collect_bomb_unknown_player() {
        let (mut room, _) = started(&["A", "B"]);
        assert_eq!(
            room.collect_bomb("Z", &[Value::Five]),
            Err(RoomError::PlayerNotFound)
        );
    }

    #[test]
    fn test_leave_broadcasts_departure() {
        let mut room = Room::new("R1", RoomSettings::default());
        let a = join(&mut room, "A");
        let b = join(&mut room, "B");
        room.drain_outbox();

        assert_eq!(
            room.remove_connection(a, Departure::Left),
            Some(Username::new("A"))
        );
        let deliveries: Vec<Delivery> = room.drain_outbox().into_iter().collect();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].to, b);
        assert_eq!(
            deliveries[0].message,
            ServerMessage::PlayerLeft {
                message: "A has left the room.".to_string()
            }
        );
        assert!(!room.is_closed());

        assert!(room.remove_connection(a, Departure::Left).is_none());
        room.remove_connection(b, Departure::Disconnected);
        assert!(room.is_closed());
    }

    #[test]
    fn test_leaving_mid_game_purges_turn_order() {
        let (mut room, connections) = started(&["A", "B", "C"]);
        let holder = current(&room);

        room.remove_connection(connections[holder.as_str()], Departure::Disconnected);

        let game = room.game().unwrap();
        assert_eq!(game.order().len(), 2);
        assert!(!game.order().contains(&holder));
        let next = current(&room);
        assert_ne!(next, holder);
        assert!(room.player(next.as_str()).is_some());
    }

    #[test]
    fn test_leaving_mid_game_with_two_players_ends_it() {
        let (mut room, connections) = started(&["A", "B"]);
        room.remove_connection(connections["A"], Departure::Left);
        match room.phase() {
            RoomPhase::Ended(ended) => assert_eq!(ended.rankings(), &[Username::new("B")]),
            other => panic!("expected ended phase, got {other:?}"),
        }
    }

    #[test]
    fn test_leaver_seated_before_current_keeps_turn() {
        let (mut room, connections) = started(&["A", "B", "C"]);
        let order = room.game().unwrap().order().to_vec();

        room.pass_turn(current_connection(&room)).unwrap();
        room.pass_turn(current_connection(&room)).unwrap();
        assert_eq!(current(&room), order[2]);

        room.remove_connection(connections[order[0].as_str()], Departure::Left);

        let game = room.game().unwrap();
        assert_eq!(game.order().len(), 2);
        assert_eq!(game.current_player(), Some(&order[2]));
        assert_eq!(game.next_player(), Some(&order[1]));
    }

    #[test]
    fn test_turn_holder_leaving_after_all_passes_clears_combination() {
        let (mut room, connections) = started(&["A", "B", "C"]);
        let order = room.game().unwrap().order().to_vec();
        let card = first_card(&room, &order[0]);

        room.play_turn(current_connection(&room), vec![card]).unwrap();
        room.pass_turn(current_connection(&room)).unwrap();
        assert_eq!(current(&room), order[2]);
        room.drain_outbox();

        room.remove_connection(connections[order[2].as_str()], Departure::Disconnected);

        let game = room.game().unwrap();
        assert_eq!(current(&room), order[0]);
        assert!(game.previous_play().is_none());
        assert!(game.played_cards().is_empty());
        assert_eq!(game.pass_count(), 0);

        let moves: Vec<ServerMessage> = room
            .drain_outbox()
            .into_iter()
            .map(|d| d.message)
            .filter(|m| matches!(m, ServerMessage::PlayerMove { .. }))
            .collect();
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| matches!(
            m,
            ServerMessage::PlayerMove { played_cards, current_player, .. }
                if played_cards.is_empty() && current_player == &order[0]
        )));
    }

    #[test]
    fn test_turn_holder_leaving_before_others_pass_keeps_combination() {
        let (mut room, connections) = started(&["A", "B", "C"]);
        let order = room.game().unwrap().order().to_vec();
        let card = first_card(&room, &order[0]);

        room.play_turn(current_connection(&room), vec![card]).unwrap();
        assert_eq!(current(&room), order[1]);

        room.remove_connection(connections[order[1].as_str()], Departure::Left);

        let game = room.game().unwrap();
        assert_eq!(current(&room), order[2]);
        assert!(game.previous_play().is_some());
        assert_eq!(game.played_cards().len(), 1);
    }

    #[test]
    fn test_reactivated_player_keeps_first_finish_position() {
        let (mut room, _) = started(&["A", "B", "C"]);
        let order = room.game().unwrap().order().to_vec();
        let (leader, x, y) = (order[0].clone(), order[1].clone(), order[2].clone());

        set_hand(&mut room, &leader, &[Value::Seven]);
        room.play_turn(current_connection(&room), vec![Value::Seven])
            .unwrap();
        assert_eq!(room.game().unwrap().rankings(), &[leader.clone()]);

        room.collect_bomb(leader.as_str(), &[Value::Four; 3]).unwrap();
        assert!(!room.player(leader.as_str()).unwrap().finished);

        // Both others pass, so the reactivated leader opens again.
        room.pass_turn(current_connection(&room)).unwrap();
        room.pass_turn(current_connection(&room)).unwrap();
        assert_eq!(current(&room), leader);

        room.play_turn(current_connection(&room), vec![Value::Four; 3])
            .unwrap();
        assert!(room.player(leader.as_str()).unwrap().finished);
        assert_eq!(room.game().unwrap().rankings(), &[leader.clone()]);

        assert_eq!(current(&room), x);
        set_hand(&mut room, &x, &[Value::Ace]);
        room.play_turn(current_connection(&room), vec![Value::Ace])
            .unwrap();

        match room.phase() {
            RoomPhase::Ended(ended) => assert_eq!(ended.rankings(), &[leader, x, y]),
            other => panic!("expected ended phase, got {other:?}"),
        }
    }

    #[test]
    fn test_reactivated_survivor_is_not_ranked_twice() {
        let (mut room, _) = started(&["A", "B", "C"]);
        let order = room.game().unwrap().order().to_vec();
        let (leader, x, y) = (order[0].clone(), order[1].clone(), order[2].clone());

        set_hand(&mut room, &leader, &[Value::Seven]);
        room.play_turn(current_connection(&room), vec![Value::Seven])
            .unwrap();
        room.collect_bomb(leader.as_str(), &[Value::Nine; 3]).unwrap();

        assert_eq!(current(&room), x);
        set_hand(&mut room, &x, &[Value::Jack]);
        room.play_turn(current_connection(&room), vec![Value::Jack])
            .unwrap();
        assert_eq!(room.game().unwrap().rankings(), &[leader.clone(), x.clone()]);

        assert_eq!(current(&room), y);
        set_hand(&mut room, &y, &[Value::King]);
        room.play_turn(current_connection(&room), vec![Value::King])
            .unwrap();

        // The reactivated leader is the survivor and already holds first place.
        match room.phase() {
            RoomPhase::Ended(ended) => assert_eq!(ended.rankings(), &[leader, x, y]),
            other => panic!("expected ended phase, got {other:?}"),
        }
    }
}
