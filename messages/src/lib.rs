//! Session message types for reissue node-to-node communication.
//!
//! Every session is an ordered request/response exchange between an
//! initiating node and one counterparty. The initiator always speaks first;
//! the counterparty answers each message with exactly one reply.

pub mod codec;

use reissue_transactions::{SignedTransaction, TransactionSignature};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use codec::{decode, encode, MAX_MESSAGE_SIZE};

/// All messages exchanged over a counterparty session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMessage {
    /// Sent exactly once, first: `true` if the receiver must sign, `false`
    /// if it only records the final transaction.
    Role { signer: bool },

    /// Transactions the receiver needs before what follows, parents first.
    History(Vec<SignedTransaction>),

    /// Attachment blobs referenced by a transaction that follows.
    Attachments(Vec<Vec<u8>>),

    /// Ask the receiver to check and sign a transaction.
    SignRequest(SignedTransaction),

    /// Reply to `SignRequest`.
    Signatures(Vec<TransactionSignature>),

    /// The notarised transaction, to be recorded.
    Finalised(SignedTransaction),

    /// Positive reply to anything but `SignRequest`.
    Ack,

    /// Negative reply, with the receiver's reason.
    Rejected(String),
}

impl SessionMessage {
    /// Short name used in logs and protocol errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Role { .. } => "Role",
            Self::History(_) => "History",
            Self::Attachments(_) => "Attachments",
            Self::SignRequest(_) => "SignRequest",
            Self::Signatures(_) => "Signatures",
            Self::Finalised(_) => "Finalised",
            Self::Ack => "Ack",
            Self::Rejected(_) => "Rejected",
        }
    }
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("message of {0} bytes exceeds the size limit")]
    TooLarge(usize),
}
