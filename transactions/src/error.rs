use reissue_types::{AttachmentId, EntityRef, PublicKey, TxId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("invalid signature by {key} on transaction {tx_id}")]
    InvalidSignature { tx_id: TxId, key: PublicKey },

    #[error("transaction {tx_id} is missing signatures from {missing:?}")]
    MissingSignatures {
        tx_id: TxId,
        missing: Vec<PublicKey>,
    },

    #[error("declared id {declared} does not match computed id {computed}")]
    IdMismatch { declared: TxId, computed: TxId },

    #[error("transaction has no commands")]
    NoCommands,

    #[error("command {0} has no signers")]
    EmptySignerSet(String),

    #[error("input {0} is consumed twice")]
    DuplicateInput(EntityRef),

    #[error("attachment {0} is referenced twice")]
    DuplicateAttachment(AttachmentId),

    #[error("output {index} declares encumbrance {encumbrance}, which is not a valid sibling output")]
    EncumbranceOutOfRange { index: u32, encumbrance: u32 },

    #[error("output {index} names a notary other than the transaction notary")]
    NotaryMismatch { index: u32 },

    #[error("input {input} is encumbered by {encumbrance}, which is not consumed alongside it")]
    EncumbranceNotConsumed {
        input: EntityRef,
        encumbrance: EntityRef,
    },

    #[error("resolved input {0} does not match the transaction inputs")]
    InputMismatch(EntityRef),

    #[error("{resolved} resolved inputs for {declared} declared inputs")]
    InputCountMismatch { declared: usize, resolved: usize },

    #[error("codec error: {0}")]
    Codec(String),
}
