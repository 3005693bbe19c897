//! Wire protocol for client-server communication.
//!
//! Every frame is one JSON object with a `type` discriminator. The
//! transport that carries the frames lives in the server crate.

/// Protocol encoding errors.
pub mod errors;

/// Message types for the client-server protocol.
pub mod messages;

/// JSON encoding and decoding with frame size limits.
pub mod utils;
