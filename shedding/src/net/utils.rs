use super::{
    errors::{ProtocolError, Result},
    messages::{ClientMessage, ServerMessage},
};

/// Maximum allowed inbound frame size (64 KiB) to bound per-message allocation
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Decode one text frame into a client message.
///
/// Frames whose `type` is unknown decode to [`ClientMessage::Unknown`];
/// malformed JSON or a known `type` with missing fields is an error.
pub fn decode_client_message(frame: &str) -> Result<ClientMessage> {
    if frame.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            actual: frame.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    serde_json::from_str(frame).map_err(ProtocolError::Decode)
}

pub fn encode_server_message(message: &ServerMessage) -> Result<String> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}
