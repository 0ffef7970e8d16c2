use reissue_types::{AttachmentId, EntityRef, PublicKey, TxId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("attachment {0} does not hash to its id")]
    AttachmentMismatch(AttachmentId),

    #[error("proof does not decode to a signed transaction: {0}")]
    Malformed(String),

    #[error("proof declares id {declared} but its content hashes to {computed}")]
    IdMismatch { declared: TxId, computed: TxId },

    #[error("proof {tx_id} carries an invalid signature by {key}")]
    InvalidSignature { tx_id: TxId, key: PublicKey },

    #[error("proof {0} consumes no entity governed by the lock")]
    NoGovernedInput(TxId),

    #[error("proof {tx_id} names notary {found}, expected {expected}")]
    WrongNotary {
        tx_id: TxId,
        expected: String,
        found: String,
    },

    #[error("proof {0} is not notarised")]
    NotNotarised(TxId),

    #[error("no proof covers governed entity {0}")]
    Uncovered(EntityRef),

    #[error("lock snapshots no entities")]
    EmptyLock,
}
