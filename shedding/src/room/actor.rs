//! Session actor: the single task that owns every room.
//!
//! Connections never touch room state directly. They send
//! [`SessionMessage`]s through a [`SessionHandle`]; the actor applies them
//! one at a time in arrival order and pushes the resulting server messages
//! into each connection's outbox.

use super::{
    config::RoomConfig,
    messages::{RoomSummary, SessionError, SessionMessage, SessionStats},
    registry::RoomRegistry,
};
use crate::game::entities::ConnectionId;
use crate::net::messages::{ClientMessage, Delivery, ServerMessage};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    /// Send a raw message to the actor
    pub async fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::Closed)
    }

    pub async fn connect(
        &self,
        connection: ConnectionId,
        outbox: mpsc::Sender<ServerMessage>,
    ) -> Result<(), SessionError> {
        self.send(SessionMessage::Connect { connection, outbox }).await
    }

    pub async fn inbound(
        &self,
        connection: ConnectionId,
        message: ClientMessage,
    ) -> Result<(), SessionError> {
        self.send(SessionMessage::Inbound {
            connection,
            message,
        })
        .await
    }

    pub async fn disconnect(&self, connection: ConnectionId) -> Result<(), SessionError> {
        self.send(SessionMessage::Disconnect { connection }).await
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, SessionError> {
        let (response, rx) = oneshot::channel();
        self.send(SessionMessage::ListRooms { response }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn stats(&self) -> Result<SessionStats, SessionError> {
        let (response, rx) = oneshot::channel();
        self.send(SessionMessage::Stats { response }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionMessage::Shutdown).await
    }
}

/// Session actor owning the room registry and every connection's outbox
pub struct SessionActor {
    registry: RoomRegistry,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Open connections and the channel back to each
    connections: HashMap<ConnectionId, mpsc::Sender<ServerMessage>>,
}

impl SessionActor {
    /// Create a new session actor
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(config: RoomConfig) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);
        let actor = Self {
            registry: RoomRegistry::new(config.settings()),
            inbox,
            connections: HashMap::new(),
        };
        (actor, SessionHandle { sender })
    }

    /// Run the session actor event loop until shutdown or until every
    /// handle is dropped.
    pub async fn run(mut self) {
        log::info!("Session actor starting");

        while let Some(message) = self.inbox.recv().await {
            if !self.handle_message(message) {
                break;
            }
        }

        log::info!(
            "Session actor stopped with {} room(s) and {} connection(s)",
            self.registry.room_count(),
            self.connections.len()
        );
    }

    /// Returns `false` once the actor should stop.
    fn handle_message(&mut self, message: SessionMessage) -> bool {
        match message {
            SessionMessage::Connect { connection, outbox } => {
                self.connections.insert(connection, outbox);
                log::debug!("Connection {connection} registered");
            }

            SessionMessage::Inbound {
                connection,
                message,
            } => {
                log::debug!("Connection {connection}: {message}");
                let deliveries = self.registry.dispatch(connection, message);
                self.deliver(deliveries);
            }

            SessionMessage::Disconnect { connection } => {
                self.connections.remove(&connection);
                let deliveries = self.registry.disconnect(connection);
                self.deliver(deliveries);
                log::debug!("Connection {connection} unregistered");
            }

            SessionMessage::ListRooms { response } => {
                let _ = response.send(self.registry.summaries());
            }

            SessionMessage::Stats { response } => {
                let _ = response.send(self.registry.stats(self.connections.len()));
            }

            SessionMessage::Shutdown => return false,
        }
        true
    }

    /// Push each message into its connection's outbox without waiting.
    ///
    /// Room messages are not repeatable snapshots (`start_game` carries the
    /// only copy of a hand), so a connection that cannot take a message is
    /// dropped, whether its outbox is full or closed. Dropping the sender
    /// closes the outbox, which tells the transport to hang up, and the
    /// player's room hears about the disconnect.
    fn deliver(&mut self, deliveries: Vec<Delivery>) {
        let mut dropped = Vec::new();
        for Delivery { to, message } in deliveries {
            let Some(sender) = self.connections.get(&to) else {
                continue;
            };
            match sender.try_send(message) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(message)) => {
                    log::warn!(
                        "Connection {to} outbox full on {} message, disconnecting",
                        message.kind()
                    );
                    self.connections.remove(&to);
                    dropped.push(to);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Connection {to} outbox closed, removing");
                    self.connections.remove(&to);
                    dropped.push(to);
                }
            }
        }

        for connection in dropped {
            let deliveries = self.registry.disconnect(connection);
            self.deliver(deliveries);
        }
    }
}
