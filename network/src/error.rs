use reissue_types::PublicKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no well-known party for key {0}")]
    UnknownIdentity(PublicKey),

    #[error("party {0} is not reachable")]
    PeerNotFound(String),

    #[error("key {0} is not held by this node")]
    KeyNotOwned(PublicKey),

    #[error("session with {0} closed")]
    SessionClosed(String),

    #[error("{party} sent {got}, expected {expected}")]
    UnexpectedMessage {
        party: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("{party} rejected the request: {reason}")]
    Rejected { party: String, reason: String },

    #[error("codec error: {0}")]
    Codec(#[from] reissue_messages::MessageError),
}
