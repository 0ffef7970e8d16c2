//! Accepting a request: emitting encumbered copies and an active lock.

use crate::config::AcceptReissuanceConfig;
use crate::error::ReissuanceError;
use crate::finality::{collect_and_finalise, Shared};
use crate::flows::{participants_of, ReissuanceFlows};
use reissue_transactions::{
    Command, CommandKind, Entity, EntityPayload, LockStatus, ReissuanceLock, SignedTransaction,
    WireTransaction,
};
use tracing::{info, warn};

impl ReissuanceFlows {
    /// Re-issue the requested entities under a new active lock.
    ///
    /// Only the issuer named in the request may accept. The requested refs
    /// must be live in the issuer's vault and not governed by any active
    /// lock. That check reads local state only: two concurrent accepts can
    /// both pass it, and the notary then finalises at most one of them since
    /// both consume the same request.
    pub async fn accept_and_reissue(
        &self,
        config: AcceptReissuanceConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let services = &self.services;
        let notary = services.notary_identity();
        config.validate(&notary)?;
        let stored = self
            .require_stored(std::slice::from_ref(&config.request))?
            .remove(0);
        let request_ref = stored.entity_ref;
        let request = stored
            .entity
            .as_request()
            .ok_or_else(|| ReissuanceError::invalid("entity is not a reissuance request"))?;
        if request.issuer != services.our_identity {
            return Err(ReissuanceError::invalid("only the named issuer may accept"));
        }

        let originals = self.require_live(&request.entity_refs)?;
        if let Some(original) = originals.iter().find(|o| o.entity.as_asset().is_none()) {
            return Err(ReissuanceError::invalid(format!(
                "{} is not an asset",
                original.entity_ref
            )));
        }
        for original in &originals {
            if let Some(lock) = services.entities.locks_governing(&original.entity_ref)?.first() {
                warn!(
                    entity = %original.entity_ref,
                    lock = %lock.entity_ref,
                    "entity already re-issued"
                );
                return Err(ReissuanceError::AlreadyReissued {
                    entity_ref: original.entity_ref,
                    lock: lock.entity_ref,
                });
            }
        }

        let issuer_key = request.issuer.owning_key;
        let lock_index = originals.len() as u32;
        let mut tx = WireTransaction::new(notary.clone()).with_input(request_ref);
        for original in &originals {
            let copy = Entity {
                notary: notary.clone(),
                encumbrance: Some(lock_index),
                ..original.entity.clone()
            };
            tx = tx.with_output(copy);
        }
        let lock = ReissuanceLock {
            issuer: request.issuer.clone(),
            requester: request.requester,
            original_entities: originals.clone(),
            status: LockStatus::Active,
            extra_unlock_signers: config.extra_unlock_signers.clone(),
        };
        let tx = tx
            .with_output(
                Entity::new(
                    EntityPayload::Lock(lock),
                    vec![request.requester, issuer_key],
                    notary,
                )
                .with_encumbrance(Some(0)),
            )
            .with_command(Command::new(CommandKind::AcceptRequest, [issuer_key]))
            .with_command(Command::new(
                CommandKind::CreateLock,
                [issuer_key, request.requester],
            ))
            .with_command(Command::asset(
                request.issuance_command.clone(),
                [issuer_key, request.requester]
                    .into_iter()
                    .chain(config.issuance_signers()),
            ));
        self.check_locally(&tx)?;

        let observers = participants_of(
            std::iter::once(&stored.entity).chain(originals.iter().map(|o| &o.entity)),
        );
        let stx = collect_and_finalise(
            services,
            SignedTransaction::new(tx),
            &observers,
            Shared::default(),
        )
        .await?;
        info!(
            tx_id = %stx.id,
            request = %request_ref,
            entities = request.entity_refs.len(),
            "entities re-issued under lock"
        );
        Ok(stx)
    }
}
