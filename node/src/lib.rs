//! A reissuance node and an in-process network to run several of them.
//!
//! The node wires the reissuance flows to their collaborators:
//! - In-memory entity, transaction and attachment stores
//! - A key manager holding the node's identity key
//! - The network's identity directory and notary
//! - Messaging that answers every inbound session with a responder

pub mod config;
pub mod error;
pub mod mock_network;
pub mod node;
pub mod tracing_spans;

pub use config::{NodeConfig, NotaryConfig};
pub use error::NodeError;
pub use mock_network::{MockMessaging, MockNetwork};
pub use node::ReissueNode;
pub use reissue_utils::{init_logging, LogFormat};
