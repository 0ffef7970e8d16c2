//! Abstract storage traits for the reissue protocol.
//!
//! Every storage backend (in-memory for testing, or a node's own persistent
//! vault) implements these traits. The rest of the codebase depends only on
//! the traits. From the protocol's point of view every store is append-only:
//! recorded transactions are never mutated or deleted.

pub mod attachment;
pub mod entity;
pub mod error;
pub mod transaction;

pub use attachment::AttachmentStore;
pub use entity::{EncumbranceFilter, EntityStore};
pub use error::StoreError;
pub use transaction::TransactionStore;
