//! Room module providing the session actor and room registry.
//!
//! This module implements:
//! - SessionActor: Async actor owning every room and connection outbox
//! - RoomRegistry: Name-keyed rooms with creation on first join and removal
//!   when a room closes
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! One actor task processes all client messages sequentially, so room
//! state is never shared between tasks. Connection tasks hold a cloned
//! [`SessionHandle`] and receive server messages on their own bounded
//! channel.
//!
//! ## Example
//!
//! ```no_run
//! use shedding::room::{RoomConfig, SessionActor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = SessionActor::new(RoomConfig::default());
//!     tokio::spawn(actor.run());
//!
//!     let rooms = handle.list_rooms().await.unwrap_or_default();
//!     println!("{} live room(s)", rooms.len());
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;

pub use actor::{SessionActor, SessionHandle};
pub use config::RoomConfig;
pub use messages::{RoomSummary, SessionError, SessionMessage, SessionStats};
pub use registry::RoomRegistry;
