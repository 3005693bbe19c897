//! Room registry: routes client messages to rooms and owns room lifetimes.

use log::{debug, info};
use std::collections::HashMap;

use super::messages::{RoomSummary, SessionStats};
use crate::game::{
    Departure, Room, RoomError, RoomSettings,
    entities::{ConnectionId, RoomName},
};
use crate::net::messages::{ClientMessage, Delivery, ServerMessage};

/// All live rooms, keyed by name, plus the room each connection sits in.
///
/// Rooms are created by the first join naming them and removed as soon as
/// they close (game over or last player gone).
#[derive(Debug, Default)]
pub struct RoomRegistry {
    settings: RoomSettings,
    rooms: HashMap<RoomName, Room>,
    memberships: HashMap<ConnectionId, RoomName>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            settings,
            rooms: HashMap::new(),
            memberships: HashMap::new(),
        }
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Room the connection is seated in.
    pub fn membership(&self, connection: ConnectionId) -> Option<&str> {
        self.memberships.get(&connection).map(String::as_str)
    }

    /// Apply one client message and return everything that must be sent
    /// as a result. Rejections go to the sender only.
    pub fn dispatch(&mut self, connection: ConnectionId, message: ClientMessage) -> Vec<Delivery> {
        let room = message.room().map(str::to_string);
        match self.apply(connection, message) {
            Ok(()) => room.map(|name| self.collect(&name)).unwrap_or_default(),
            Err(error) => {
                debug!("{connection}: rejected with {error:?}");
                vec![Delivery::new(connection, ServerMessage::from(error))]
            }
        }
    }

    /// Remove a closed connection from whatever room it was in.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<Delivery> {
        let Some(name) = self.memberships.remove(&connection) else {
            return Vec::new();
        };
        if let Some(room) = self.rooms.get_mut(&name) {
            room.remove_connection(connection, Departure::Disconnected);
        }
        self.collect(&name)
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .values()
            .map(|room| RoomSummary {
                name: room.name().to_string(),
                player_count: room.players().len(),
                max_players: room.settings().max_players,
                phase: room.phase().kind(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    pub fn stats(&self, connections: usize) -> SessionStats {
        SessionStats {
            rooms: self.rooms.len(),
            connections,
            players: self.memberships.len(),
        }
    }

    fn apply(&mut self, connection: ConnectionId, message: ClientMessage) -> Result<(), RoomError> {
        match message {
            ClientMessage::Join { room, player_name } => {
                if self.memberships.contains_key(&connection) {
                    return Err(RoomError::AlreadyInRoom);
                }
                let settings = self.settings;
                let entry = self.rooms.entry(room.clone()).or_insert_with(|| {
                    info!("room {room} created");
                    Room::new(&room, settings)
                });
                let result = entry.join(connection, player_name);
                if entry.is_closed() {
                    self.rooms.remove(&room);
                }
                result?;
                self.memberships.insert(connection, room);
                Ok(())
            }
            ClientMessage::Ready { room } => {
                self.room_mut(&room)?.ready();
                Ok(())
            }
            ClientMessage::PlayTurn { room, cards } => {
                self.room_mut(&room)?.play_turn(connection, cards)
            }
            ClientMessage::PassTurn { room } => self.room_mut(&room)?.pass_turn(connection),
            ClientMessage::CollectBomb {
                room,
                player_name,
                bomb_cards,
            } => self
                .room_mut(&room)?
                .collect_bomb(player_name.as_str(), &bomb_cards),
            ClientMessage::Leave { room } => {
                let left = self
                    .rooms
                    .get_mut(&room)
                    .and_then(|r| r.remove_connection(connection, Departure::Left));
                if left.is_some() {
                    self.memberships.remove(&connection);
                }
                Ok(())
            }
            ClientMessage::Unknown => Err(RoomError::UnknownMessageType),
        }
    }

    fn room_mut(&mut self, name: &str) -> Result<&mut Room, RoomError> {
        self.rooms.get_mut(name).ok_or(RoomError::RoomNotFound)
    }

    /// Drain a room's queued messages and delete it if it closed.
    fn collect(&mut self, name: &str) -> Vec<Delivery> {
        let Some(room) = self.rooms.get_mut(name) else {
            return Vec::new();
        };
        let deliveries: Vec<Delivery> = room.drain_outbox().into();
        if room.is_closed() {
            self.rooms.remove(name);
            self.memberships.retain(|_, seated| seated.as_str() != name);
            info!("room {name} deleted");
        }
        deliveries
    }
}
