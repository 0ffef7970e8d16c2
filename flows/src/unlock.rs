//! Unlocking re-issued entities against exit proofs.

use crate::config::{IssuerSignaturePolicy, UnlockConfig};
use crate::error::ReissuanceError;
use crate::finality::{collect_and_finalise, Shared};
use crate::flows::{governed_inputs, participants_of, ReissuanceFlows};
use reissue_transactions::{
    Command, CommandKind, Entity, EntityPayload, SignedTransaction, WireTransaction,
};
use reissue_verification::ProofVerifier;
use tracing::{info, warn};

impl ReissuanceFlows {
    /// Release the copies governed by an active lock into free circulation.
    ///
    /// Every proof is verified before anything is sent; one bad proof fails
    /// the whole unlock. The lock is re-emitted inactive and the copies are
    /// re-emitted without encumbrance, with the proofs attached.
    pub async fn unlock_reissued_entities(
        &self,
        config: UnlockConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        config.validate()?;
        let services = &self.services;
        let (lock, state) = self.require_own_active_lock(&config.lock)?;
        let governed = self.require_stored(&config.governed)?;
        let inputs = governed_inputs(&lock, &state, &governed)?;

        let mut proofs = Vec::with_capacity(config.proofs.len());
        for id in &config.proofs {
            let blob = services.attachments.open(id).map_err(|_| {
                ReissuanceError::invalid(format!("proof {id} has not been imported"))
            })?;
            proofs.push((*id, blob));
        }
        if let Err(e) = ProofVerifier::new(&state)?.verify_all(&proofs) {
            warn!(lock = %lock.entity_ref, error = %e, "unlock refused");
            return Err(e.into());
        }

        let notary = services.notary_identity();
        let mut tx = WireTransaction::new(notary.clone());
        for input in &inputs {
            tx = tx.with_input(input.entity_ref);
        }
        for copy in &inputs[..inputs.len() - 1] {
            tx = tx.with_output(Entity {
                notary: notary.clone(),
                encumbrance: None,
                ..copy.entity.clone()
            });
        }
        tx = tx.with_output(Entity::new(
            EntityPayload::Lock(state.deactivated()),
            lock.entity.participants.clone(),
            notary,
        ));
        for id in &config.proofs {
            tx = tx.with_attachment(*id);
        }

        let mut signers = vec![state.requester];
        signers.extend(config.extra_signers.iter().copied());
        signers.extend(state.extra_unlock_signers.iter().copied());
        if config.issuer_policy == IssuerSignaturePolicy::Sign {
            signers.push(state.issuer.owning_key);
        }
        let tx = tx
            .with_command(Command::new(CommandKind::DeactivateLock, [state.requester]))
            .with_command(Command::asset(config.unlock_command.clone(), signers));
        self.check_locally(&tx)?;

        let mut observers = vec![state.issuer.owning_key];
        observers.extend(participants_of(inputs.iter().map(|i| &i.entity)));
        let stx = collect_and_finalise(
            services,
            SignedTransaction::new(tx),
            &observers,
            Shared {
                history: Vec::new(),
                attachments: proofs.into_iter().map(|(_, blob)| blob).collect(),
            },
        )
        .await?;
        info!(
            tx_id = %stx.id,
            lock = %lock.entity_ref,
            released = inputs.len() - 1,
            "re-issued entities unlocked"
        );
        Ok(stx)
    }
}
