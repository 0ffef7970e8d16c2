//! Plain asset flows: issue, move and exit.
//!
//! These produce the histories reissuance works over. A move hands the new
//! holder the full back-chain of what it moves, so provenance can be shown
//! onwards; an exit is what a holder later presents as an unlock proof.

use crate::error::ReissuanceError;
use crate::finality::{collect_and_finalise, Shared};
use crate::flows::ReissuanceFlows;
use reissue_transactions::codec::encode_signed;
use reissue_transactions::{
    AssetData, Command, Entity, EntityAndRef, EntityPayload, SignedTransaction, WireTransaction,
};
use reissue_types::Party;
use tracing::info;

pub const ISSUE_COMMAND: &str = "Issue";
pub const MOVE_COMMAND: &str = "Move";
pub const EXIT_COMMAND: &str = "Exit";

/// Serialize a finalised transaction into an exit-proof blob.
pub fn proof_blob(stx: &SignedTransaction) -> Result<Vec<u8>, ReissuanceError> {
    Ok(encode_signed(stx)?)
}

impl ReissuanceFlows {
    /// Issue a new asset to `holder`, signed by this node.
    pub async fn issue_asset(
        &self,
        asset: AssetData,
        holder: &Party,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let services = &self.services;
        let notary = services.notary_identity();
        let tx = WireTransaction::new(notary.clone())
            .with_output(Entity::new(
                EntityPayload::Asset(asset),
                vec![holder.owning_key],
                notary,
            ))
            .with_command(Command::asset(
                ISSUE_COMMAND,
                [services.our_identity.owning_key],
            ));
        self.check_locally(&tx)?;
        let stx = collect_and_finalise(
            services,
            SignedTransaction::new(tx),
            &[holder.owning_key],
            Shared::default(),
        )
        .await?;
        info!(tx_id = %stx.id, holder = %holder, "asset issued");
        Ok(stx)
    }

    /// Move a held asset to `new_holder`, forwarding its back-chain.
    pub async fn move_asset(
        &self,
        asset: &EntityAndRef,
        new_holder: &Party,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let services = &self.services;
        let asset = self.require_stored(std::slice::from_ref(asset))?.remove(0);
        let notary = services.notary_identity();
        let moved = Entity {
            participants: vec![new_holder.owning_key],
            notary: notary.clone(),
            encumbrance: None,
            ..asset.entity.clone()
        };
        let tx = WireTransaction::new(notary)
            .with_input(asset.entity_ref)
            .with_output(moved)
            .with_command(Command::asset(
                MOVE_COMMAND,
                asset.entity.participants.iter().copied(),
            ));
        self.check_locally(&tx)?;

        let stx = collect_and_finalise(
            services,
            SignedTransaction::new(tx),
            &[new_holder.owning_key],
            Shared::default(),
        )
        .await?;
        info!(tx_id = %stx.id, to = %new_holder, "asset moved");
        Ok(stx)
    }

    /// Consume a held asset, producing nothing.
    pub async fn exit_asset(
        &self,
        asset: &EntityAndRef,
    ) -> Result<SignedTransaction, ReissuanceError> {
        let services = &self.services;
        let asset = self.require_stored(std::slice::from_ref(asset))?.remove(0);
        let tx = WireTransaction::new(services.notary_identity())
            .with_input(asset.entity_ref)
            .with_command(Command::asset(
                EXIT_COMMAND,
                asset.entity.participants.iter().copied(),
            ));
        self.check_locally(&tx)?;
        let stx =
            collect_and_finalise(services, SignedTransaction::new(tx), &[], Shared::default())
                .await?;
        info!(tx_id = %stx.id, asset = %asset.entity_ref, "asset exited");
        Ok(stx)
    }
}
