//! The collaborators a node's flows run against.

use reissue_consensus::NotaryService;
use reissue_network::{IdentityService, KeyManager, Messaging};
use reissue_store::{AttachmentStore, EntityStore, TransactionStore};
use reissue_types::Party;
use std::sync::Arc;

/// Everything a flow may touch, owned by the node.
pub struct NodeServices {
    pub our_identity: Party,
    pub entities: Arc<dyn EntityStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub identity: Arc<dyn IdentityService>,
    pub keys: Arc<dyn KeyManager>,
    pub notary: Arc<dyn NotaryService>,
    pub messaging: Arc<dyn Messaging>,
}

impl NodeServices {
    /// The notary every transaction built by this node names.
    pub fn notary_identity(&self) -> Party {
        self.notary.notary_identity()
    }
}
