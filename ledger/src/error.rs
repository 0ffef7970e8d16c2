use reissue_types::{EntityRef, TxId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transaction {0} is not in the local archive")]
    NotFound(TxId),

    #[error("transaction {} has no output {}", .0.tx_id, .0.index)]
    MissingOutput(EntityRef),

    #[error("storage error: {0}")]
    Storage(#[from] reissue_store::StoreError),
}
