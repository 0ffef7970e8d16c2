//! The reissuance state machine.
//!
//! A holder whose asset's history cannot be shown to counterparties asks the
//! issuer to re-create it. The issuer emits encumbered copies paired with an
//! active lock. The holder then consumes the original in a notarised exit
//! transaction and presents that transaction as proof to unlock the copies.
//!
//! ```text
//! request ──► accept ──► lock ACTIVE ──► unlock ──► lock INACTIVE + free copies
//!    │                        │
//!    └──► reject              └──► delete (copies and lock consumed)
//! ```
//!
//! Every operation runs its local checks before any network activity and
//! finalises exactly one notarised transaction or nothing.

pub mod accept;
pub mod asset;
pub mod config;
pub mod contract;
pub mod delete;
pub mod error;
pub mod finality;
pub mod flows;
pub mod reject;
pub mod request;
pub mod responder;
pub mod services;
pub mod unlock;

pub use config::{
    AcceptReissuanceConfig, DeleteConfig, IssuerSignaturePolicy, RequestReissuanceConfig,
    UnlockConfig,
};
pub use contract::{verify_transaction, ContractError};
pub use error::ReissuanceError;
pub use flows::ReissuanceFlows;
pub use responder::Responder;
pub use services::NodeServices;
