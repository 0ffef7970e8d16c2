//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Every collaborator the protocol consumes (entity store, transaction
//! archive, attachment store, identity service, key manager) is a trait.
//! This crate provides in-memory implementations that:
//! - Are thread-safe and cheap to construct
//! - Can be inspected and seeded programmatically
//! - Never touch the filesystem or network
//!
//! Usage: wire nullables into a node for tests and the in-process network.

pub mod identity;
pub mod store;

pub use identity::{NullIdentityService, NullKeyManager};
pub use store::{NullAttachmentStore, NullEntityStore, NullTransactionStore};
