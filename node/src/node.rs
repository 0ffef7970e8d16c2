//! A running node: its configuration, services and flow entry points.

use std::collections::HashSet;
use std::sync::Arc;

use reissue_flows::asset::proof_blob;
use reissue_flows::{
    AcceptReissuanceConfig, DeleteConfig, NodeServices, ReissuanceError, ReissuanceFlows,
    RequestReissuanceConfig, UnlockConfig,
};
use reissue_store::EncumbranceFilter;
use reissue_transactions::{AssetData, EntityAndRef, LockStatus, SignedTransaction};
use reissue_types::{AttachmentId, Party, TxId};
use tracing::Instrument;

use crate::config::NodeConfig;
use crate::tracing_spans::{asset_span, decide_span, release_span, request_span};

/// One node on the network.
///
/// Every flow runs inside a span carrying the node's legal name, so logs of
/// several in-process nodes stay distinguishable.
pub struct ReissueNode {
    pub config: NodeConfig,
    flows: ReissuanceFlows,
}

impl ReissueNode {
    pub fn new(config: NodeConfig, services: Arc<NodeServices>) -> Self {
        Self {
            config,
            flows: ReissuanceFlows::new(services),
        }
    }

    pub fn party(&self) -> &Party {
        &self.flows.services().our_identity
    }

    pub fn services(&self) -> &Arc<NodeServices> {
        self.flows.services()
    }

    fn name(&self) -> &str {
        &self.config.legal_name
    }

    // ── Reissuance ─────────────────────────────────────────────────────

    /// Request reissuance, forwarding history when the node is configured to.
    pub async fn request(
        &self,
        config: RequestReissuanceConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        if self.config.share_history {
            self.request_reissuance_and_share_history(config).await
        } else {
            self.request_reissuance(config).await
        }
    }

    pub async fn request_reissuance(
        &self,
        config: RequestReissuanceConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = request_span(self.name(), &config.issuer.name, config.entity_refs.len());
        self.flows.request_reissuance(config).instrument(span).await
    }

    pub async fn request_reissuance_and_share_history(
        &self,
        config: RequestReissuanceConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = request_span(self.name(), &config.issuer.name, config.entity_refs.len());
        self.flows
            .request_reissuance_and_share_history(config)
            .instrument(span)
            .await
    }

    pub async fn accept_and_reissue(
        &self,
        config: AcceptReissuanceConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = decide_span(self.name(), "accept", &config.request.entity_ref.to_string());
        self.flows.accept_and_reissue(config).instrument(span).await
    }

    pub async fn reject_request(
        &self,
        request: EntityAndRef,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = decide_span(self.name(), "reject", &request.entity_ref.to_string());
        self.flows.reject_request(request).instrument(span).await
    }

    /// An unlock config carrying this node's issuer signature policy.
    pub fn unlock_config(
        &self,
        lock: EntityAndRef,
        governed: Vec<EntityAndRef>,
        proofs: Vec<AttachmentId>,
        unlock_command: impl Into<String>,
    ) -> UnlockConfig {
        UnlockConfig::new(lock, governed, proofs, unlock_command)
            .with_issuer_policy(self.config.issuer_policy())
    }

    pub async fn unlock_reissued_entities(
        &self,
        config: UnlockConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = release_span(self.name(), "unlock", &config.lock.entity_ref.to_string());
        self.flows.unlock_reissued_entities(config).instrument(span).await
    }

    pub async fn delete_reissued_entities_and_lock(
        &self,
        config: DeleteConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = release_span(self.name(), "delete", &config.lock.entity_ref.to_string());
        self.flows
            .delete_reissued_entities_and_lock(config)
            .instrument(span)
            .await
    }

    // ── Assets ─────────────────────────────────────────────────────────

    pub async fn issue_asset(
        &self,
        asset: AssetData,
        holder: &Party,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = asset_span(self.name(), "issue");
        self.flows.issue_asset(asset, holder).instrument(span).await
    }

    pub async fn move_asset(
        &self,
        asset: &EntityAndRef,
        new_holder: &Party,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = asset_span(self.name(), "move");
        self.flows.move_asset(asset, new_holder).instrument(span).await
    }

    pub async fn exit_asset(
        &self,
        asset: &EntityAndRef,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let span = asset_span(self.name(), "exit");
        self.flows.exit_asset(asset).instrument(span).await
    }

    /// Import a finalised exit transaction as a proof attachment.
    pub fn import_exit_proof(
        &self,
        exit: &SignedTransaction,
    ) -> Result<AttachmentId, ReissuanceError> {
        self.flows.import_proof(&proof_blob(exit)?)
    }

    pub fn import_proof(&self, blob: &[u8]) -> Result<AttachmentId, ReissuanceError> {
        self.flows.import_proof(blob)
    }

    // ── Vault queries ──────────────────────────────────────────────────

    pub fn assets(
        &self,
        kind: &str,
        filter: EncumbranceFilter,
    ) -> Result<Vec<EntityAndRef>, ReissuanceError> {
        Ok(self.services().entities.query_assets(kind, filter)?)
    }

    pub fn requests(&self) -> Result<Vec<EntityAndRef>, ReissuanceError> {
        Ok(self.services().entities.query_requests()?)
    }

    pub fn locks(&self, status: LockStatus) -> Result<Vec<EntityAndRef>, ReissuanceError> {
        Ok(self.services().entities.query_locks(status)?)
    }

    pub fn transaction(&self, id: &TxId) -> Result<SignedTransaction, ReissuanceError> {
        Ok(self.services().transactions.get_transaction(id)?)
    }

    pub fn ancestors_of(&self, id: &TxId) -> Result<HashSet<TxId>, ReissuanceError> {
        self.flows.ancestors_of(id)
    }
}
