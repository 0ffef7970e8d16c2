//! Message codec: bincode framing for session messages.

use crate::{MessageError, SessionMessage};
use bincode::Options;

/// Maximum message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16 MiB

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_MESSAGE_SIZE as u64)
        .reject_trailing_bytes()
}

/// Encode a message for transmission.
pub fn encode(message: &SessionMessage) -> Result<Vec<u8>, MessageError> {
    options().serialize(message).map_err(|e| match *e {
        bincode::ErrorKind::SizeLimit => MessageError::TooLarge(MAX_MESSAGE_SIZE),
        other => MessageError::Malformed(other.to_string()),
    })
}

/// Decode a message from raw bytes.
pub fn decode(data: &[u8]) -> Result<SessionMessage, MessageError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(MessageError::TooLarge(data.len()));
    }
    options()
        .deserialize(data)
        .map_err(|e| MessageError::Malformed(e.to_string()))
}
