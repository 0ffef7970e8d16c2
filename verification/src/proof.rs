//! Checking exit proofs against a reissuance lock snapshot.

use crate::error::VerificationError;
use reissue_crypto::hash_attachment;
use reissue_transactions::codec::decode_signed;
use reissue_transactions::{EntityAndRef, ReissuanceLock, SignedTransaction, TransactionError};
use reissue_types::{AttachmentId, EntityRef, TxId};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// What a proof established.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedProof {
    pub tx_id: TxId,
    /// Snapshot refs this proof consumed.
    pub consumed: Vec<EntityRef>,
}

/// Verifies exit proofs for one lock.
pub struct ProofVerifier<'a> {
    snapshot: &'a [EntityAndRef],
}

impl<'a> ProofVerifier<'a> {
    pub fn new(lock: &'a ReissuanceLock) -> Result<Self, VerificationError> {
        if lock.original_entities.is_empty() {
            return Err(VerificationError::EmptyLock);
        }
        Ok(Self {
            snapshot: &lock.original_entities,
        })
    }

    /// Verify one attachment blob stored under `id`.
    pub fn verify(&self, id: &AttachmentId, blob: &[u8]) -> Result<VerifiedProof, VerificationError> {
        if hash_attachment(blob) != *id {
            return Err(VerificationError::AttachmentMismatch(*id));
        }

        let stx = decode_signed(blob).map_err(|e| VerificationError::Malformed(e.to_string()))?;
        stx.check_id().map_err(|e| match e {
            TransactionError::IdMismatch { declared, computed } => {
                VerificationError::IdMismatch { declared, computed }
            }
            other => VerificationError::Malformed(other.to_string()),
        })?;

        let governed: Vec<&EntityAndRef> = self
            .snapshot
            .iter()
            .filter(|original| stx.tx.inputs.contains(&original.entity_ref))
            .collect();
        if governed.is_empty() {
            return Err(VerificationError::NoGovernedInput(stx.id));
        }

        for original in &governed {
            let expected = &original.entity.notary;
            if stx.tx.notary != *expected {
                return Err(VerificationError::WrongNotary {
                    tx_id: stx.id,
                    expected: expected.name.clone(),
                    found: stx.tx.notary.name.clone(),
                });
            }
        }

        check_signatures(&stx)?;
        if !stx.is_notarised_by(&stx.tx.notary) {
            return Err(VerificationError::NotNotarised(stx.id));
        }

        let consumed: Vec<EntityRef> = governed.iter().map(|o| o.entity_ref).collect();
        debug!(tx_id = %stx.id, consumed = consumed.len(), "exit proof verified");
        Ok(VerifiedProof {
            tx_id: stx.id,
            consumed,
        })
    }

    /// Verify every proof and require that together they cover the snapshot.
    ///
    /// Fails on the first bad proof; no proof is accepted on its own.
    pub fn verify_all(
        &self,
        proofs: &[(AttachmentId, Vec<u8>)],
    ) -> Result<Vec<VerifiedProof>, VerificationError> {
        let mut verified = Vec::with_capacity(proofs.len());
        for (id, blob) in proofs {
            match self.verify(id, blob) {
                Ok(proof) => verified.push(proof),
                Err(e) => {
                    warn!(attachment = %id, error = %e, "exit proof rejected");
                    return Err(e);
                }
            }
        }

        let covered: BTreeSet<EntityRef> = verified
            .iter()
            .flat_map(|p| p.consumed.iter().copied())
            .collect();
        if let Some(missing) = self
            .snapshot
            .iter()
            .map(|o| o.entity_ref)
            .find(|r| !covered.contains(r))
        {
            return Err(VerificationError::Uncovered(missing));
        }
        Ok(verified)
    }
}

fn check_signatures(stx: &SignedTransaction) -> Result<(), VerificationError> {
    match stx.signatures.iter().find(|s| !s.verify(&stx.id)) {
        Some(bad) => Err(VerificationError::InvalidSignature {
            tx_id: stx.id,
            key: bad.by,
        }),
        None => Ok(()),
    }
}
