//! Fundamental types for the reissue protocol.
//!
//! This crate defines the identifiers shared across every other crate in the
//! workspace: content-addressed transaction and attachment ids, Ed25519 key
//! material, network identities and entity references.

pub mod entity_ref;
pub mod hash;
pub mod keys;
pub mod party;

pub use entity_ref::EntityRef;
pub use hash::{AttachmentId, TxId};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use party::Party;
