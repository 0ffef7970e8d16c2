//! Wire and signed transactions.

use crate::codec;
use crate::command::Command;
use crate::entity::Entity;
use crate::error::TransactionError;
use reissue_crypto::{hash_transaction, sign_message, verify_signature};
use reissue_types::{AttachmentId, EntityRef, Party, PrivateKey, PublicKey, Signature, TxId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The signed-over content of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub inputs: Vec<EntityRef>,
    pub outputs: Vec<Entity>,
    pub commands: Vec<Command>,
    pub notary: Party,
    pub attachments: Vec<AttachmentId>,
    /// Random bytes keeping otherwise-identical transactions distinct.
    pub salt: [u8; 32],
}

impl WireTransaction {
    pub fn new(notary: Party) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            commands: Vec::new(),
            notary,
            attachments: Vec::new(),
            salt: rand::random(),
        }
    }

    pub fn with_input(mut self, input: EntityRef) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: Entity) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentId) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Content address: Blake2b-256 over the canonical encoding.
    pub fn compute_id(&self) -> TxId {
        let bytes = codec::encode(self).expect("WireTransaction is always serializable");
        hash_transaction(&bytes)
    }

    /// Union of every command's signers.
    pub fn required_signing_keys(&self) -> BTreeSet<PublicKey> {
        self.commands
            .iter()
            .flat_map(|c| c.signers.iter().copied())
            .collect()
    }

    /// Reference to output `index` of this transaction.
    pub fn out_ref(&self, index: u32) -> EntityRef {
        EntityRef::new(self.compute_id(), index)
    }
}

/// A signature over a transaction id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub by: PublicKey,
    pub signature: Signature,
}

impl TransactionSignature {
    pub fn sign(id: &TxId, by: PublicKey, private: &PrivateKey) -> Self {
        Self {
            by,
            signature: sign_message(id.as_bytes(), private),
        }
    }

    pub fn verify(&self, id: &TxId) -> bool {
        verify_signature(id.as_bytes(), &self.signature, &self.by)
    }
}

/// A wire transaction plus collected signatures.
///
/// `id` travels on the wire next to the content; [`SignedTransaction::check_id`]
/// recomputes it so a blob cannot claim an id its content does not hash to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub id: TxId,
    pub tx: WireTransaction,
    pub signatures: Vec<TransactionSignature>,
}

impl SignedTransaction {
    pub fn new(tx: WireTransaction) -> Self {
        Self {
            id: tx.compute_id(),
            tx,
            signatures: Vec::new(),
        }
    }

    /// Add a signature, ignoring a second signature by the same key.
    pub fn add_signature(&mut self, signature: TransactionSignature) {
        if !self.signatures.iter().any(|s| s.by == signature.by) {
            self.signatures.push(signature);
        }
    }

    pub fn with_signatures(
        mut self,
        signatures: impl IntoIterator<Item = TransactionSignature>,
    ) -> Self {
        for sig in signatures {
            self.add_signature(sig);
        }
        self
    }

    pub fn out_ref(&self, index: u32) -> EntityRef {
        EntityRef::new(self.id, index)
    }

    pub fn required_signing_keys(&self) -> BTreeSet<PublicKey> {
        self.tx.required_signing_keys()
    }

    /// Whether the declared id is the content address of `tx`.
    pub fn check_id(&self) -> Result<(), TransactionError> {
        let computed = self.tx.compute_id();
        if computed != self.id {
            return Err(TransactionError::IdMismatch {
                declared: self.id,
                computed,
            });
        }
        Ok(())
    }

    /// Whether a valid signature by `key` is present.
    pub fn is_signed_by(&self, key: &PublicKey) -> bool {
        self.signatures
            .iter()
            .any(|s| s.by == *key && s.verify(&self.id))
    }

    pub fn is_notarised_by(&self, notary: &Party) -> bool {
        self.is_signed_by(&notary.owning_key)
    }

    /// Check id integrity, that every present signature is valid, and that every
    /// required key outside `allowed_missing` has signed.
    pub fn verify_signatures_except(
        &self,
        allowed_missing: &[PublicKey],
    ) -> Result<(), TransactionError> {
        self.check_id()?;
        for sig in &self.signatures {
            if !sig.verify(&self.id) {
                return Err(TransactionError::InvalidSignature {
                    tx_id: self.id,
                    key: sig.by,
                });
            }
        }
        let present: BTreeSet<PublicKey> = self.signatures.iter().map(|s| s.by).collect();
        let missing: Vec<PublicKey> = self
            .required_signing_keys()
            .into_iter()
            .filter(|k| !present.contains(k) && !allowed_missing.contains(k))
            .collect();
        if !missing.is_empty() {
            return Err(TransactionError::MissingSignatures {
                tx_id: self.id,
                missing,
            });
        }
        Ok(())
    }

    pub fn verify_required_signatures(&self) -> Result<(), TransactionError> {
        self.verify_signatures_except(&[])
    }
}
