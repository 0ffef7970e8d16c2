use reissue_consensus::NotaryError;
use reissue_ledger::LedgerError;
use reissue_network::NetworkError;
use reissue_store::StoreError;
use reissue_transactions::TransactionError;
use reissue_types::{EntityRef, TxId};
use reissue_verification::VerificationError;
use thiserror::Error;

use crate::contract::ContractError;

#[derive(Debug, Error)]
pub enum ReissuanceError {
    /// A caller precondition does not hold. Raised before any network I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The entity already sits under an active lock.
    #[error("{entity_ref} is already re-issued under lock {lock}")]
    AlreadyReissued { entity_ref: EntityRef, lock: EntityRef },

    /// A transaction, signature, contract or proof check failed.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// An ancestor transaction is not held locally.
    #[error("transaction {0} not found")]
    NotFound(TxId),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("network error: {0}")]
    Network(NetworkError),

    /// The notary refused to finalise, e.g. a double spend.
    #[error("notary rejected the transaction: {0}")]
    Notary(NotaryError),
}

impl ReissuanceError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}

impl From<LedgerError> for ReissuanceError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound(id) => Self::NotFound(id),
            LedgerError::MissingOutput(r) => Self::InvalidArgument(format!("{r} does not exist")),
            LedgerError::Storage(e) => Self::Store(e),
        }
    }
}

impl From<NetworkError> for ReissuanceError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::Rejected { party, reason } => {
                Self::VerificationFailed(format!("{party}: {reason}"))
            }
            other => Self::Network(other),
        }
    }
}

impl From<NotaryError> for ReissuanceError {
    fn from(e: NotaryError) -> Self {
        match e {
            NotaryError::Conflict { .. } | NotaryError::Unavailable(_) => Self::Notary(e),
            other => Self::VerificationFailed(other.to_string()),
        }
    }
}

impl From<VerificationError> for ReissuanceError {
    fn from(e: VerificationError) -> Self {
        Self::VerificationFailed(e.to_string())
    }
}

impl From<TransactionError> for ReissuanceError {
    fn from(e: TransactionError) -> Self {
        Self::VerificationFailed(e.to_string())
    }
}

impl From<ContractError> for ReissuanceError {
    fn from(e: ContractError) -> Self {
        match e {
            ContractError::Store(e) => Self::Store(e),
            other => Self::VerificationFailed(other.to_string()),
        }
    }
}
