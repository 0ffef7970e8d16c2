//! Cryptographic primitives for the reissue protocol.
//!
//! - **Ed25519** for transaction signing and signature verification
//! - **Blake2b-256** for content addressing (transaction ids, attachment ids)

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, hash_attachment, hash_transaction};
pub use keys::keypair_from_seed;
pub use sign::{sign_message, verify_signature};
