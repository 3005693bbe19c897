//! # Shedding
//!
//! A realtime multiplayer shedding card game engine built around a per-room
//! state machine.
//!
//! Players join named rooms, signal readiness, and once everyone is ready
//! the room deals a shuffled 54-card deck and runs turns in a random order.
//! Players take turns putting cards down or passing; the first to empty
//! their hand ranks first, and the game ends when one player is left.
//!
//! ## Room lifecycle
//!
//! - **Lobby**: Accepting joins and ready signals
//! - **InProgress**: Turn order, open combination, rankings
//! - **Ended**: Rankings are final and the room is removed
//!
//! ## Core Modules
//!
//! - [`game`]: Deck, entities, and the room state machine
//! - [`net`]: JSON wire protocol
//! - [`room`]: Session actor and room registry
//!
//! ## Example
//!
//! ```
//! use shedding::{Room, RoomSettings, entities::{ConnectionId, Username}};
//!
//! let mut room = Room::new("R1", RoomSettings::default());
//! room.join(ConnectionId::new(), Username::new("A")).unwrap();
//! assert_eq!(room.players().len(), 1);
//! ```

/// Wire protocol for client-server communication.
pub mod net;
pub use net::{messages, utils};

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    Departure, Room, RoomError, RoomPhase, RoomSettings, TurnAction,
    constants::{self, MAX_PLAYERS, MIN_PLAYERS},
    deck, entities,
};

/// Session actor and room registry.
pub mod room;
