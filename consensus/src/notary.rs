//! Notary service trait and a single-node uniqueness notary.

use crate::error::NotaryError;
use async_trait::async_trait;
use reissue_transactions::{validate_structure, SignedTransaction, TransactionSignature};
use reissue_types::{EntityRef, KeyPair, Party, TxId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// A consensus authority that finalises transactions.
#[async_trait]
pub trait NotaryService: Send + Sync {
    fn notary_identity(&self) -> Party;

    /// Sign `stx` if all of its inputs are unconsumed, and consume them.
    ///
    /// `stx` must carry every required signature except the notary's own.
    /// Re-submitting an already notarised transaction returns a fresh
    /// signature without conflict.
    async fn notarise(&self, stx: &SignedTransaction) -> Result<TransactionSignature, NotaryError>;
}

/// A notary that keeps its consumed-reference map in memory.
pub struct SingleNodeNotary {
    identity: Party,
    keypair: KeyPair,
    consumed: Mutex<HashMap<EntityRef, TxId>>,
}

impl SingleNodeNotary {
    pub fn new(name: impl Into<String>, keypair: KeyPair) -> Self {
        Self {
            identity: Party::new(name, keypair.public),
            keypair,
            consumed: Mutex::new(HashMap::new()),
        }
    }

    /// The transaction that consumed `entity_ref`, if this notary has seen one.
    pub fn consumed_by(&self, entity_ref: &EntityRef) -> Result<Option<TxId>, NotaryError> {
        Ok(self.consumed()?.get(entity_ref).copied())
    }

    fn consumed(&self) -> Result<MutexGuard<'_, HashMap<EntityRef, TxId>>, NotaryError> {
        self.consumed
            .lock()
            .map_err(|_| NotaryError::Unavailable("consumed-reference map is poisoned".into()))
    }

    fn check(&self, stx: &SignedTransaction) -> Result<(), NotaryError> {
        if stx.tx.notary != self.identity {
            return Err(NotaryError::WrongNotary(stx.tx.notary.name.clone()));
        }
        validate_structure(&stx.tx).map_err(|e| NotaryError::InvalidTransaction(e.to_string()))?;
        stx.verify_signatures_except(&[self.identity.owning_key])
            .map_err(|e| NotaryError::InvalidTransaction(e.to_string()))
    }
}

#[async_trait]
impl NotaryService for SingleNodeNotary {
    fn notary_identity(&self) -> Party {
        self.identity.clone()
    }

    async fn notarise(&self, stx: &SignedTransaction) -> Result<TransactionSignature, NotaryError> {
        self.check(stx)?;

        {
            let mut consumed = self.consumed()?;
            for input in &stx.tx.inputs {
                if let Some(by) = consumed.get(input) {
                    if *by != stx.id {
                        warn!(tx_id = %stx.id, input = %input, consumed_by = %by, "double spend rejected");
                        return Err(NotaryError::Conflict {
                            entity_ref: *input,
                            consumed_by: *by,
                        });
                    }
                }
            }
            for input in &stx.tx.inputs {
                consumed.insert(*input, stx.id);
            }
        }

        debug!(tx_id = %stx.id, inputs = stx.tx.inputs.len(), "transaction notarised");
        Ok(TransactionSignature::sign(
            &stx.id,
            self.keypair.public,
            &self.keypair.private,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reissue_crypto::keypair_from_seed;
    use reissue_transactions::{AssetData, Command, Entity, EntityPayload, WireTransaction};

    fn notary() -> SingleNodeNotary {
        SingleNodeNotary::new("Notary", keypair_from_seed(&[9u8; 32]))
    }

    fn spend(notary: &Party, input: EntityRef) -> SignedTransaction {
        let owner = keypair_from_seed(&[1u8; 32]);
        let tx = WireTransaction::new(notary.clone())
            .with_input(input)
            .with_output(Entity::new(
                EntityPayload::Asset(AssetData::new("Token", b"1".to_vec())),
                vec![owner.public],
                notary.clone(),
            ))
            .with_command(Command::asset("Move", [owner.public]));
        let mut stx = SignedTransaction::new(tx);
        stx.add_signature(TransactionSignature::sign(&stx.id, owner.public, &owner.private));
        stx
    }

    fn input() -> EntityRef {
        EntityRef::new(TxId::new([4u8; 32]), 0)
    }

    #[tokio::test]
    async fn notarised_transaction_verifies() {
        let notary = notary();
        let stx = spend(&notary.notary_identity(), input());
        let sig = notary.notarise(&stx).await.unwrap();
        assert!(sig.verify(&stx.id));
        assert_eq!(sig.by, notary.notary_identity().owning_key);
        assert_eq!(notary.consumed_by(&input()).unwrap(), Some(stx.id));
    }

    #[tokio::test]
    async fn double_spend_is_rejected() {
        let notary = notary();
        let first = spend(&notary.notary_identity(), input());
        let second = spend(&notary.notary_identity(), input());
        notary.notarise(&first).await.unwrap();
        match notary.notarise(&second).await {
            Err(NotaryError::Conflict { entity_ref, consumed_by }) => {
                assert_eq!(entity_ref, input());
                assert_eq!(consumed_by, first.id);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resubmission_is_idempotent() {
        let notary = notary();
        let stx = spend(&notary.notary_identity(), input());
        notary.notarise(&stx).await.unwrap();
        assert!(notary.notarise(&stx).await.is_ok());
    }

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let notary = notary();
        let mut stx = spend(&notary.notary_identity(), input());
        stx.signatures.clear();
        assert!(matches!(
            notary.notarise(&stx).await,
            Err(NotaryError::InvalidTransaction(_))
        ));
        assert_eq!(notary.consumed_by(&input()).unwrap(), None);
    }

    #[tokio::test]
    async fn foreign_notary_is_rejected() {
        let notary = notary();
        let other = Party::new("Other", keypair_from_seed(&[8u8; 32]).public);
        let stx = spend(&other, input());
        assert!(matches!(
            notary.notarise(&stx).await,
            Err(NotaryError::WrongNotary(name)) if name == "Other"
        ));
    }

    #[tokio::test]
    async fn poisoned_state_reports_unavailable() {
        let notary = std::sync::Arc::new(notary());
        let poisoner = notary.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.consumed.lock().unwrap();
            panic!("poison the consumed-reference map");
        })
        .join();

        let stx = spend(&notary.notary_identity(), input());
        assert!(matches!(
            notary.notarise(&stx).await,
            Err(NotaryError::Unavailable(_))
        ));
        assert!(matches!(
            notary.consumed_by(&input()),
            Err(NotaryError::Unavailable(_))
        ));
    }
}
