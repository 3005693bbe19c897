//! Shedding game engine - room state machine and card logic.
//!
//! This module provides the game implementation including:
//! - Deck construction and shuffling
//! - Player and combination entities
//! - The per-room lifecycle (lobby, game in progress, ended)

pub mod constants;
pub mod deck;
pub mod entities;
pub mod state_machine;
pub mod states;

pub use state_machine::{Departure, Room, RoomError, RoomPhase, RoomSettings, TurnAction};
