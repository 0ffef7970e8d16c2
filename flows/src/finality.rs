//! Signature collection, notarisation and distribution.

use crate::error::ReissuanceError;
use crate::services::NodeServices;
use reissue_crypto::hash_attachment;
use reissue_ledger::{record_transaction, BackchainResolver};
use reissue_messages::SessionMessage;
use reissue_network::{open_sessions, NetworkError, RoleSession, SessionRole, SignerSetBuilder};
use reissue_transactions::SignedTransaction;
use reissue_types::{AttachmentId, PublicKey, TxId};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// What to send counterparties alongside the transaction itself.
#[derive(Default)]
pub struct Shared {
    /// Transactions the counterparties should record first. Their back-chains
    /// are added before sending.
    pub history: Vec<SignedTransaction>,
    /// Attachment blobs referenced by the transaction.
    pub attachments: Vec<Vec<u8>>,
}

/// Collect every required signature, notarise, record locally and hand the
/// final transaction to every counterparty.
///
/// Local keys sign first. Each remote signer then receives the attachments,
/// the back-chain and the transaction and answers with its signatures.
/// Observers receive the attachments and back-chain and, at the end, the
/// notarised transaction. Nothing is recorded anywhere unless the notary
/// signs.
pub async fn collect_and_finalise(
    services: &NodeServices,
    mut stx: SignedTransaction,
    observer_keys: &[PublicKey],
    shared: Shared,
) -> Result<SignedTransaction, ReissuanceError> {
    let notary_key = stx.tx.notary.owning_key;
    let required: BTreeSet<PublicKey> = stx
        .required_signing_keys()
        .into_iter()
        .filter(|k| *k != notary_key)
        .collect();
    let set = SignerSetBuilder::new(
        services.identity.as_ref(),
        services.keys.as_ref(),
        &services.our_identity,
    )
    .build(&required, observer_keys)?;

    for key in &set.local_keys {
        stx.add_signature(services.keys.sign(key, &stx.id)?);
    }

    let shared = with_backchain(services, &stx, shared)?;
    let mut sessions = open_sessions(services.messaging.as_ref(), &set).await?;
    for session in sessions.iter_mut() {
        if !shared.attachments.is_empty() {
            session
                .session
                .send_expecting_ack(SessionMessage::Attachments(shared.attachments.clone()))
                .await?;
        }
        if !shared.history.is_empty() {
            session
                .session
                .send_expecting_ack(SessionMessage::History(shared.history.clone()))
                .await?;
        }
        if session.role == SessionRole::Signer {
            collect_from(session, &mut stx, &required).await?;
        }
    }

    stx.verify_signatures_except(&[notary_key])?;
    let notary_signature = services.notary.notarise(&stx).await?;
    stx.add_signature(notary_signature);
    record_transaction(
        services.transactions.as_ref(),
        services.entities.as_ref(),
        &stx,
    )?;

    for session in sessions.iter_mut() {
        session
            .session
            .send_expecting_ack(SessionMessage::Finalised(stx.clone()))
            .await?;
    }

    info!(
        tx_id = %stx.id,
        signers = required.len(),
        sessions = sessions.len(),
        "transaction finalised"
    );
    Ok(stx)
}

/// Widen `shared` to the full back-chain of `stx` and of the given history,
/// parents first, plus every attachment those transactions carry, so a
/// counterparty can verify each one before recording it.
fn with_backchain(
    services: &NodeServices,
    stx: &SignedTransaction,
    shared: Shared,
) -> Result<Shared, ReissuanceError> {
    let mut roots: BTreeSet<TxId> = shared.history.iter().map(|t| t.id).collect();
    roots.extend(stx.tx.inputs.iter().map(|r| r.tx_id));
    let roots: Vec<TxId> = roots.into_iter().collect();
    let history = BackchainResolver::new(services.transactions.as_ref()).collect_backchain(&roots)?;

    let mut attachments = shared.attachments;
    let mut held: BTreeSet<AttachmentId> = attachments.iter().map(|b| hash_attachment(b)).collect();
    for id in history
        .iter()
        .chain(std::iter::once(stx))
        .flat_map(|t| &t.tx.attachments)
    {
        if held.insert(*id) {
            attachments.push(services.attachments.open(id)?);
        }
    }
    debug!(
        tx_id = %stx.id,
        history = history.len(),
        attachments = attachments.len(),
        "sharing back-chain"
    );
    Ok(Shared {
        history,
        attachments,
    })
}

async fn collect_from(
    session: &mut RoleSession,
    stx: &mut SignedTransaction,
    required: &BTreeSet<PublicKey>,
) -> Result<(), ReissuanceError> {
    let party = session.party().name.clone();
    let reply = session
        .session
        .send_and_receive(SessionMessage::SignRequest(stx.clone()))
        .await?;
    match reply {
        SessionMessage::Signatures(signatures) => {
            for signature in signatures {
                if !required.contains(&signature.by) || !signature.verify(&stx.id) {
                    warn!(party = %party, key = %signature.by, "discarding unusable signature");
                    return Err(ReissuanceError::VerificationFailed(format!(
                        "{party} returned an invalid signature"
                    )));
                }
                stx.add_signature(signature);
            }
            debug!(party = %party, tx_id = %stx.id, "signatures collected");
            Ok(())
        }
        SessionMessage::Rejected(reason) => {
            warn!(party = %party, reason = %reason, "counterparty refused to sign");
            Err(NetworkError::Rejected { party, reason }.into())
        }
        other => Err(NetworkError::UnexpectedMessage {
            party,
            expected: "Signatures",
            got: other.kind(),
        }
        .into()),
    }
}
