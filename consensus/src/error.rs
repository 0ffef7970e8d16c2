use reissue_types::{EntityRef, TxId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotaryError {
    #[error("input {entity_ref} was already consumed by {consumed_by}")]
    Conflict {
        entity_ref: EntityRef,
        consumed_by: TxId,
    },

    #[error("transaction names notary {0}, not this notary")]
    WrongNotary(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("notary unavailable: {0}")]
    Unavailable(String),
}
