//! Consensus: double-spend prevention by a notary.
//!
//! The reissue protocol never decides on its own whether an entity is still
//! unconsumed. Every transaction is submitted to the notary named in it; the
//! notary signs a transaction only if none of its inputs has been consumed
//! by a different transaction, and then remembers them as consumed.
//!
//! ## Module overview
//!
//! - [`notary`]: the [`NotaryService`] trait and the single-node notary.
//! - [`error`]: notarisation rejections.

pub mod error;
pub mod notary;

pub use error::NotaryError;
pub use notary::{NotaryService, SingleNodeNotary};
