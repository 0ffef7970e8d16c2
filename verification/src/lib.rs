//! Exit-proof verification.
//!
//! Before a reissuance lock may be deactivated, its requester must show that
//! every original entity the lock snapshots was genuinely consumed. The proof
//! is the consuming transaction itself, serialized as an attachment. This
//! crate decides whether such a blob is acceptable:
//!
//! 1. it decodes to a `SignedTransaction` whose declared id is its content
//!    address (a hand-built look-alike fails here);
//! 2. it is notarised by the notary recorded on the snapshot entity;
//! 3. it consumes the snapshot entity by exact reference.

pub mod error;
pub mod proof;

pub use error::VerificationError;
pub use proof::{ProofVerifier, VerifiedProof};
