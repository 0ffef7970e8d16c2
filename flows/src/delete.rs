//! Deleting re-issued entities together with their lock.

use crate::config::DeleteConfig;
use crate::error::ReissuanceError;
use crate::finality::{collect_and_finalise, Shared};
use crate::flows::{governed_inputs, participants_of, ReissuanceFlows};
use reissue_transactions::{Command, CommandKind, SignedTransaction, WireTransaction};
use tracing::info;

impl ReissuanceFlows {
    /// Consume an active lock and every copy it governs, producing nothing.
    pub async fn delete_reissued_entities_and_lock(
        &self,
        config: DeleteConfig,
    ) -> Result<SignedTransaction, ReissuanceError> {
        config.validate()?;
        let services = &self.services;
        let (lock, state) = self.require_own_active_lock(&config.lock)?;
        let governed = self.require_stored(&config.governed)?;
        let inputs = governed_inputs(&lock, &state, &governed)?;
        let refs: Vec<_> = inputs.iter().map(|i| i.entity_ref).collect();

        let exit_signers = if config.signers.is_empty() {
            vec![state.requester]
        } else {
            config.signers.clone()
        };
        let mut tx = WireTransaction::new(services.notary_identity());
        for r in &refs {
            tx = tx.with_input(*r);
        }
        let tx = tx
            .with_command(Command::new(CommandKind::DeleteLock, [state.requester]))
            .with_command(Command::asset(config.exit_command.clone(), exit_signers));
        self.check_locally(&tx)?;

        let mut observers = vec![state.issuer.owning_key];
        observers.extend(participants_of(inputs.iter().map(|i| &i.entity)));
        let stx = collect_and_finalise(
            services,
            SignedTransaction::new(tx),
            &observers,
            Shared::default(),
        )
        .await?;
        info!(tx_id = %stx.id, lock = %lock.entity_ref, "re-issued entities deleted");
        Ok(stx)
    }
}
