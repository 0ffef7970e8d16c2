//! Ledger views over the local transaction archive.
//!
//! - **Back-chain resolution**: the transitive closure of the "consumes"
//!   relation ending at a transaction, walked iteratively so arbitrarily deep
//!   histories cannot overflow the stack
//! - **Recording**: appending a finalised transaction to the archive and
//!   updating the entity store (consumed inputs, produced outputs)

pub mod backchain;
pub mod error;
pub mod recorder;

pub use backchain::{BackchainResolver, TransactionLookup};
pub use error::LedgerError;
pub use recorder::{record_transaction, resolve_inputs};
