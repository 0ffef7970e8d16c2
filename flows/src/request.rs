//! Requesting re-issuance from an issuer.

use crate::config::RequestReissuanceConfig;
use crate::error::ReissuanceError;
use crate::finality::{collect_and_finalise, Shared};
use crate::flows::ReissuanceFlows;
use reissue_ledger::BackchainResolver;
use reissue_transactions::{
    Command, CommandKind, Entity, EntityPayload, ReissuanceRequest, SignedTransaction,
    WireTransaction,
};
use reissue_types::TxId;
use std::collections::BTreeSet;
use tracing::{debug, info};

impl ReissuanceFlows {
    /// Create a reissuance request and send it to the issuer.
    ///
    /// The issuer must already be able to resolve the requested refs.
    pub async fn request_reissuance(
        &self,
        config: RequestReissuanceConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        self.request(config, false).await
    }

    /// As [`Self::request_reissuance`], also forwarding the back-chain of
    /// every requested entity the issuer does not participate in.
    pub async fn request_reissuance_and_share_history(
        &self,
        config: RequestReissuanceConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        self.request(config, true).await
    }

    async fn request(
        &self,
        config: RequestReissuanceConfig,
        share_history: bool,
    ) -> Result<SignedTransaction, ReissuanceError> {
        config.validate()?;
        let services = &self.services;
        if !services.keys.owns(&config.requester_key) {
            return Err(ReissuanceError::invalid("requester key is not held by this node"));
        }
        if config.co_located_requester && config.issuer != services.our_identity {
            return Err(ReissuanceError::invalid(
                "a co-located requester must share the issuer's node",
            ));
        }

        let history = if share_history && !config.co_located_requester {
            self.history_for_issuer(&config)?
        } else {
            Vec::new()
        };

        let notary = services.notary_identity();
        let request = ReissuanceRequest {
            issuer: config.issuer.clone(),
            requester: config.requester_key,
            entity_refs: config.entity_refs.clone(),
            issuance_command: config.issuance_command.clone(),
            required_signers: config.extra_issuance_signers.clone(),
        };
        let tx = WireTransaction::new(notary.clone())
            .with_output(Entity::new(
                EntityPayload::Request(request),
                vec![config.requester_key, config.issuer.owning_key],
                notary,
            ))
            .with_command(Command::new(
                CommandKind::CreateRequest,
                [config.requester_key],
            ));
        self.check_locally(&tx)?;

        let stx = collect_and_finalise(
            services,
            SignedTransaction::new(tx),
            &[config.issuer.owning_key],
            Shared {
                history,
                attachments: Vec::new(),
            },
        )
        .await?;
        info!(
            tx_id = %stx.id,
            issuer = %config.issuer,
            entities = config.entity_refs.len(),
            "reissuance requested"
        );
        Ok(stx)
    }

    /// Back-chains of the requested entities, skipped for entities the
    /// issuer already participates in.
    fn history_for_issuer(
        &self,
        config: &RequestReissuanceConfig,
    ) -> Result<Vec<SignedTransaction>, ReissuanceError> {
        let resolved = self.services.entities.resolve(&config.entity_refs)?;
        let roots: BTreeSet<TxId> = config
            .entity_refs
            .iter()
            .zip(resolved)
            .filter(|(_, entity)| {
                !entity
                    .as_ref()
                    .is_some_and(|e| e.entity.participants.contains(&config.issuer.owning_key))
            })
            .map(|(r, _)| r.tx_id)
            .collect();
        if roots.is_empty() {
            debug!(issuer = %config.issuer, "issuer participates in every entity, no history shared");
            return Ok(Vec::new());
        }
        let roots: Vec<TxId> = roots.into_iter().collect();
        let history = BackchainResolver::new(self.services.transactions.as_ref())
            .collect_backchain(&roots)?;
        debug!(issuer = %config.issuer, transactions = history.len(), "sharing history");
        Ok(history)
    }
}
