//! An in-process network of nodes sharing one notary.
//!
//! Every session opened through [`MockMessaging`] is a channel pair; the far
//! end is answered by a [`Responder`] spawned on the target node.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use reissue_consensus::{NotaryService, SingleNodeNotary};
use reissue_flows::{NodeServices, Responder};
use reissue_network::{ChannelSession, CounterpartySession, Messaging, NetworkError};
use reissue_nullables::{
    NullAttachmentStore, NullEntityStore, NullIdentityService, NullKeyManager,
    NullTransactionStore,
};
use reissue_types::Party;
use tracing::{warn, Instrument};

use crate::config::{NodeConfig, NotaryConfig};
use crate::node::ReissueNode;
use crate::tracing_spans::respond_span;
use crate::NodeError;

/// Nodes reachable by legal name.
#[derive(Default)]
struct Directory {
    nodes: Mutex<HashMap<String, Weak<NodeServices>>>,
}

impl Directory {
    fn lookup(&self, name: &str) -> Option<Arc<NodeServices>> {
        self.nodes
            .lock()
            .expect("directory lock poisoned")
            .get(name)
            .and_then(Weak::upgrade)
    }
}

/// Messaging for one node on a [`MockNetwork`].
pub struct MockMessaging {
    us: Party,
    directory: Arc<Directory>,
}

#[async_trait]
impl Messaging for MockMessaging {
    async fn open_session(
        &self,
        counterparty: &Party,
    ) -> Result<Box<dyn CounterpartySession>, NetworkError> {
        let target = self
            .directory
            .lookup(&counterparty.name)
            .ok_or_else(|| NetworkError::PeerNotFound(counterparty.name.clone()))?;
        let (ours, theirs) = ChannelSession::pair(self.us.clone(), counterparty.clone());
        let span = respond_span(&counterparty.name, &self.us.name);
        tokio::spawn(
            async move {
                if let Err(e) = Responder::new(target).run(Box::new(theirs)).await {
                    warn!(error = %e, "session ended with an error");
                }
            }
            .instrument(span),
        );
        Ok(Box::new(ours))
    }
}

/// A set of nodes, a shared identity directory and a single notary.
///
/// Nodes are held weakly; dropping a [`ReissueNode`] takes it off the
/// network.
pub struct MockNetwork {
    notary: Arc<SingleNodeNotary>,
    identity: Arc<NullIdentityService>,
    directory: Arc<Directory>,
}

impl MockNetwork {
    pub fn new(notary: NotaryConfig) -> Result<Self, NodeError> {
        let keys = notary.keypair()?;
        let notary = Arc::new(SingleNodeNotary::new(notary.name, keys));
        let identity = Arc::new(NullIdentityService::new());
        identity.register_party(&notary.notary_identity());
        Ok(Self {
            notary,
            identity,
            directory: Arc::new(Directory::default()),
        })
    }

    pub fn notary(&self) -> &Arc<SingleNodeNotary> {
        &self.notary
    }

    /// Start a node and make it reachable under its legal name.
    pub fn create_node(&self, config: NodeConfig) -> Result<ReissueNode, NodeError> {
        if self.directory.lookup(&config.legal_name).is_some() {
            return Err(NodeError::DuplicateNode(config.legal_name));
        }
        let keys = config.keypair()?;
        let us = Party::new(config.legal_name.clone(), keys.public);
        self.identity.register_party(&us);

        let services = Arc::new(NodeServices {
            our_identity: us.clone(),
            entities: Arc::new(NullEntityStore::new()),
            transactions: Arc::new(NullTransactionStore::new()),
            attachments: Arc::new(NullAttachmentStore::new()),
            identity: self.identity.clone(),
            keys: Arc::new(NullKeyManager::with_keypair(keys)),
            notary: self.notary.clone(),
            messaging: Arc::new(MockMessaging {
                us,
                directory: self.directory.clone(),
            }),
        });
        self.directory
            .nodes
            .lock()
            .expect("directory lock poisoned")
            .insert(config.legal_name.clone(), Arc::downgrade(&services));
        Ok(ReissueNode::new(config, services))
    }
}
