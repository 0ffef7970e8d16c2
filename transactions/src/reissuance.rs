//! Reissuance request and lock states.

use crate::entity::EntityAndRef;
use reissue_types::{EntityRef, Party, PublicKey};
use serde::{Deserialize, Serialize};

/// A holder's request that `issuer` re-create the entities at `entity_refs`.
///
/// Consumed exactly once, by an accept (reissue) or a reject transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReissuanceRequest {
    pub issuer: Party,
    pub requester: PublicKey,
    pub entity_refs: Vec<EntityRef>,
    /// Name of the asset command the issuer uses to re-create the entities.
    pub issuance_command: String,
    /// Issuance signers besides the issuer and the requester.
    pub required_signers: Vec<PublicKey>,
}

/// Whether a lock still governs its re-issued copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockStatus {
    Active,
    Inactive,
}

/// The custody constraint paired with every re-issued copy.
///
/// While `Active`, each governed copy is encumbered by the lock, so the copies
/// can only move together with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReissuanceLock {
    pub issuer: Party,
    pub requester: PublicKey,
    /// Snapshot of the original entities, by exact reference.
    pub original_entities: Vec<EntityAndRef>,
    pub status: LockStatus,
    pub extra_unlock_signers: Vec<PublicKey>,
}

impl ReissuanceLock {
    pub fn is_active(&self) -> bool {
        self.status == LockStatus::Active
    }

    /// The original references this lock was issued against.
    pub fn original_refs(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.original_entities.iter().map(|e| e.entity_ref)
    }

    pub fn governs(&self, entity_ref: &EntityRef) -> bool {
        self.original_entities
            .iter()
            .any(|e| e.entity_ref == *entity_ref)
    }

    /// The same lock with status flipped to `Inactive`.
    pub fn deactivated(&self) -> Self {
        Self {
            status: LockStatus::Inactive,
            ..self.clone()
        }
    }
}
