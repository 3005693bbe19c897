//! Table limits shared by the room state machine and its configuration.

/// Maximum number of players seated in a single room.
pub const MAX_PLAYERS: usize = 5;

/// A game can't start with fewer players than this.
pub const MIN_PLAYERS: usize = 2;

/// Copies of every rank value in a fresh deck.
pub const COPIES_PER_RANK: usize = 4;

/// 13 ranks of four copies plus both jokers.
pub const DECK_SIZE: usize = 13 * COPIES_PER_RANK + 2;
