//! The counterparty side of a session.

use crate::contract::verify_transaction;
use crate::error::ReissuanceError;
use crate::services::NodeServices;
use reissue_ledger::{record_transaction, resolve_inputs};
use reissue_messages::SessionMessage;
use reissue_network::{CounterpartySession, NetworkError, SessionRole};
use reissue_transactions::{SignedTransaction, TransactionSignature};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Answers one session opened by another node.
///
/// The first message must be the role flag. After that the responder
/// imports attachments, records forwarded history, signs if it is a
/// signer and the transaction checks out, and finally records the
/// notarised transaction, which ends the session. Nothing is recorded
/// unless it is notarised and its contracts verify.
pub struct Responder {
    services: Arc<NodeServices>,
}

impl Responder {
    pub fn new(services: Arc<NodeServices>) -> Self {
        Self { services }
    }

    pub async fn run(self, mut session: Box<dyn CounterpartySession>) -> Result<(), ReissuanceError> {
        let party = session.counterparty().name.clone();
        let role = match session.receive().await? {
            SessionMessage::Role { signer } => SessionRole::from_flag(signer),
            other => {
                session
                    .send(SessionMessage::Rejected("expected a role flag".into()))
                    .await?;
                return Err(NetworkError::UnexpectedMessage {
                    party,
                    expected: "Role",
                    got: other.kind(),
                }
                .into());
            }
        };
        session.send(SessionMessage::Ack).await?;
        debug!(from = %party, ?role, "responding");

        loop {
            let message = match session.receive().await {
                Ok(message) => message,
                Err(NetworkError::SessionClosed(_)) => {
                    debug!(from = %party, "session closed before finalisation");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            let kind = message.kind();
            let (reply, done) = match message {
                SessionMessage::History(txs) => (self.reply(self.record_history(&txs)), false),
                SessionMessage::Attachments(blobs) => {
                    (self.reply(self.import_attachments(&blobs)), false)
                }
                SessionMessage::SignRequest(stx) => match role {
                    SessionRole::Observer => (
                        SessionMessage::Rejected("not a required signer".into()),
                        false,
                    ),
                    SessionRole::Signer => match self.check_and_sign(&stx) {
                        Ok(signatures) => (SessionMessage::Signatures(signatures), false),
                        Err(e) => {
                            warn!(from = %party, tx_id = %stx.id, error = %e, "refusing to sign");
                            (SessionMessage::Rejected(e.to_string()), false)
                        }
                    },
                },
                SessionMessage::Finalised(stx) => (self.reply(self.record_final(&stx)), true),
                other => (
                    SessionMessage::Rejected(format!("unexpected {}", other.kind())),
                    false,
                ),
            };
            if let SessionMessage::Rejected(reason) = &reply {
                debug!(from = %party, message = kind, reason = %reason, "rejected");
            }
            session.send(reply).await?;
            if done {
                return Ok(());
            }
        }
    }

    fn reply(&self, outcome: Result<(), ReissuanceError>) -> SessionMessage {
        match outcome {
            Ok(()) => SessionMessage::Ack,
            Err(e) => SessionMessage::Rejected(e.to_string()),
        }
    }

    /// Accept only finalised transactions into the archive.
    fn check_finalised(stx: &SignedTransaction) -> Result<(), ReissuanceError> {
        stx.verify_required_signatures()?;
        if !stx.is_notarised_by(&stx.tx.notary) {
            return Err(ReissuanceError::VerificationFailed(format!(
                "{} is not notarised",
                stx.id
            )));
        }
        Ok(())
    }

    fn record_history(&self, txs: &[SignedTransaction]) -> Result<(), ReissuanceError> {
        for stx in txs {
            self.verify_and_record(stx)?;
        }
        debug!(count = txs.len(), "history recorded");
        Ok(())
    }

    /// Record a finalised transaction once its contracts hold against
    /// inputs from the local archive. Already archived transactions are
    /// left as they are.
    fn verify_and_record(&self, stx: &SignedTransaction) -> Result<bool, ReissuanceError> {
        Self::check_finalised(stx)?;
        let archive = self.services.transactions.as_ref();
        if archive.exists(&stx.id)? {
            return Ok(false);
        }
        let inputs = resolve_inputs(archive, &stx.tx)?;
        verify_transaction(&stx.tx, &inputs, self.services.attachments.as_ref())?;
        Ok(record_transaction(
            archive,
            self.services.entities.as_ref(),
            stx,
        )?)
    }

    fn import_attachments(&self, blobs: &[Vec<u8>]) -> Result<(), ReissuanceError> {
        for blob in blobs {
            self.services.attachments.import(blob)?;
        }
        Ok(())
    }

    fn check_and_sign(
        &self,
        stx: &SignedTransaction,
    ) -> Result<Vec<TransactionSignature>, ReissuanceError> {
        stx.check_id()?;
        let inputs = resolve_inputs(self.services.transactions.as_ref(), &stx.tx)?;
        verify_transaction(&stx.tx, &inputs, self.services.attachments.as_ref())?;

        let keys = self.services.keys.as_ref();
        let mut signatures = Vec::new();
        for key in stx.required_signing_keys() {
            if keys.owns(&key) {
                signatures.push(keys.sign(&key, &stx.id)?);
            }
        }
        if signatures.is_empty() {
            return Err(ReissuanceError::invalid("no required key is held here"));
        }
        debug!(tx_id = %stx.id, count = signatures.len(), "signed");
        Ok(signatures)
    }

    fn record_final(&self, stx: &SignedTransaction) -> Result<(), ReissuanceError> {
        let recorded = self.verify_and_record(stx)?;
        info!(tx_id = %stx.id, recorded, "finalised transaction received");
        Ok(())
    }
}
