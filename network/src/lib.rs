//! Counterparty communication for the reissue protocol.
//!
//! - **Identity**: mapping keys to well-known parties, and the local key manager
//! - **Sessions**: one ordered request/response channel per counterparty
//! - **Signer sets**: partitioning required signers into local keys, remote
//!   signer parties and observer parties, and opening one session per
//!   remote party with its role flag

pub mod error;
pub mod identity;
pub mod session;
pub mod signers;

pub use error::NetworkError;
pub use identity::{IdentityService, KeyManager};
pub use session::{ChannelSession, CounterpartySession, Messaging};
pub use signers::{open_sessions, RoleSession, SessionRole, SignerSet, SignerSetBuilder};
