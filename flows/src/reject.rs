//! Rejecting a request.

use crate::error::ReissuanceError;
use crate::finality::{collect_and_finalise, Shared};
use crate::flows::ReissuanceFlows;
use reissue_transactions::{Command, CommandKind, EntityAndRef, SignedTransaction, WireTransaction};
use tracing::info;

impl ReissuanceFlows {
    /// Consume a request without re-issuing anything.
    ///
    /// The requester receives the rejection only when it is another node.
    pub async fn reject_request(
        &self,
        request: EntityAndRef,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let services = &self.services;
        let request = self.require_stored(std::slice::from_ref(&request))?.remove(0);
        let state = request
            .entity
            .as_request()
            .ok_or_else(|| ReissuanceError::invalid("entity is not a reissuance request"))?;
        if state.issuer != services.our_identity {
            return Err(ReissuanceError::invalid("only the named issuer may reject"));
        }

        let tx = WireTransaction::new(services.notary_identity())
            .with_input(request.entity_ref)
            .with_command(Command::new(
                CommandKind::RejectRequest,
                [state.issuer.owning_key],
            ));
        self.check_locally(&tx)?;

        let stx = collect_and_finalise(
            services,
            SignedTransaction::new(tx),
            &[state.requester],
            Shared::default(),
        )
        .await?;
        info!(tx_id = %stx.id, request = %request.entity_ref, "reissuance request rejected");
        Ok(stx)
    }
}
