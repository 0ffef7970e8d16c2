//! Transaction archive trait.

use crate::StoreError;
use reissue_transactions::SignedTransaction;
use reissue_types::TxId;

/// Trait for the transaction archive.
pub trait TransactionStore: Send + Sync {
    /// Store a transaction keyed by its id. Storing the same id twice is a no-op.
    fn put_transaction(&self, tx: &SignedTransaction) -> Result<(), StoreError>;

    /// Retrieve a transaction by id.
    fn get_transaction(&self, id: &TxId) -> Result<SignedTransaction, StoreError>;

    /// Check if a transaction exists.
    fn exists(&self, id: &TxId) -> Result<bool, StoreError>;

    /// Total number of transactions in the archive.
    fn transaction_count(&self) -> Result<u64, StoreError>;
}
