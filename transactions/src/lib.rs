//! Entity and transaction model for the reissue protocol.
//!
//! - **Entity**: a unit of ledger state (an asset, a reissuance request or a
//!   reissuance lock) with its participants, notary and optional encumbrance
//! - **WireTransaction**: inputs, outputs, commands, notary and attachments,
//!   content-addressed by the Blake2b-256 digest of its canonical encoding
//! - **SignedTransaction**: a wire transaction plus the signatures collected
//!   over its id

pub mod codec;
pub mod command;
pub mod entity;
pub mod error;
pub mod reissuance;
pub mod transaction;
pub mod validation;

pub use command::{Command, CommandKind};
pub use entity::{AssetData, Entity, EntityAndRef, EntityPayload};
pub use error::TransactionError;
pub use reissuance::{LockStatus, ReissuanceLock, ReissuanceRequest};
pub use transaction::{SignedTransaction, TransactionSignature, WireTransaction};
pub use validation::{validate_encumbrances, validate_structure};
