//! The flow entry point and checks shared by the operations.

use crate::contract::verify_transaction;
use crate::error::ReissuanceError;
use crate::services::NodeServices;
use reissue_ledger::{resolve_inputs, BackchainResolver};
use reissue_transactions::{EntityAndRef, ReissuanceLock, WireTransaction};
use reissue_types::{AttachmentId, EntityRef, PublicKey, TxId};
use std::collections::HashSet;
use std::sync::Arc;

/// Runs the reissuance operations on behalf of one node.
///
/// The operations live in their own modules: `request`, `accept`, `reject`,
/// `unlock`, `delete` and the plain asset flows in `asset`.
#[derive(Clone)]
pub struct ReissuanceFlows {
    pub(crate) services: Arc<NodeServices>,
}

impl ReissuanceFlows {
    pub fn new(services: Arc<NodeServices>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &Arc<NodeServices> {
        &self.services
    }

    /// Store an exit proof blob and return its content address.
    pub fn import_proof(&self, blob: &[u8]) -> Result<AttachmentId, ReissuanceError> {
        Ok(self.services.attachments.import(blob)?)
    }

    /// Transaction ids `id` transitively consumes from, `id` included.
    pub fn ancestors_of(&self, id: &TxId) -> Result<HashSet<TxId>, ReissuanceError> {
        Ok(BackchainResolver::new(self.services.transactions.as_ref()).ancestors_of(id)?)
    }

    /// Contract check of a transaction built here, before any network I/O.
    ///
    /// Inputs are read back from the local archive, never taken from the
    /// caller.
    pub(crate) fn check_locally(&self, tx: &WireTransaction) -> Result<(), ReissuanceError> {
        let inputs = resolve_inputs(self.services.transactions.as_ref(), tx)?;
        verify_transaction(tx, &inputs, self.services.attachments.as_ref())?;
        Ok(())
    }

    /// Resolve refs to live local entities, failing on the first that is
    /// unknown or already consumed.
    pub(crate) fn require_live(
        &self,
        refs: &[EntityRef],
    ) -> Result<Vec<EntityAndRef>, ReissuanceError> {
        let resolved = self.services.entities.resolve(refs)?;
        refs.iter()
            .zip(resolved)
            .map(|(r, entity)| {
                entity.ok_or_else(|| {
                    ReissuanceError::invalid(format!("{r} is not a live entity in this vault"))
                })
            })
            .collect()
    }

    /// The vault's copy of each given entity.
    ///
    /// Fails when a ref is not live or when the given entity differs from
    /// what the vault holds under that ref.
    pub(crate) fn require_stored(
        &self,
        given: &[EntityAndRef],
    ) -> Result<Vec<EntityAndRef>, ReissuanceError> {
        let refs: Vec<_> = given.iter().map(|g| g.entity_ref).collect();
        let stored = self.require_live(&refs)?;
        if let Some((g, _)) = given.iter().zip(&stored).find(|(g, s)| g.entity != s.entity) {
            return Err(ReissuanceError::invalid(format!(
                "{} differs from the vault's copy",
                g.entity_ref
            )));
        }
        Ok(stored)
    }

    /// The lock as an active, live local entity held for a key of ours.
    pub(crate) fn require_own_active_lock(
        &self,
        lock: &EntityAndRef,
    ) -> Result<(EntityAndRef, ReissuanceLock), ReissuanceError> {
        let stored = self.require_stored(std::slice::from_ref(lock))?.remove(0);
        let state = stored
            .entity
            .as_lock()
            .cloned()
            .ok_or_else(|| ReissuanceError::invalid("entity is not a reissuance lock"))?;
        if !state.is_active() {
            return Err(ReissuanceError::invalid("lock is no longer active"));
        }
        if !self.services.keys.owns(&state.requester) {
            return Err(ReissuanceError::invalid(
                "only the lock's requester may release it",
            ));
        }
        Ok((stored, state))
    }
}

/// Check that `governed` is exactly the set of live copies under `lock`
/// and return them in snapshot order, followed by the lock.
pub(crate) fn governed_inputs(
    lock: &EntityAndRef,
    state: &ReissuanceLock,
    governed: &[EntityAndRef],
) -> Result<Vec<EntityAndRef>, ReissuanceError> {
    if governed.len() != state.original_entities.len() {
        return Err(ReissuanceError::invalid(format!(
            "lock governs {} entities, {} given",
            state.original_entities.len(),
            governed.len()
        )));
    }
    let mut ordered = governed.to_vec();
    ordered.sort_by_key(|g| g.entity_ref.index);
    for (position, copy) in ordered.iter().enumerate() {
        let under_lock = copy.entity_ref.tx_id == lock.entity_ref.tx_id
            && copy.entity_ref.index as usize == position
            && copy.entity.encumbrance == Some(lock.entity_ref.index);
        if !under_lock {
            return Err(ReissuanceError::invalid(format!(
                "{} is not governed by lock {}",
                copy.entity_ref, lock.entity_ref
            )));
        }
    }
    ordered.push(lock.clone());
    Ok(ordered)
}

/// Every participant key of `entities`, deduplicated.
pub(crate) fn participants_of<'a>(
    entities: impl IntoIterator<Item = &'a reissue_transactions::Entity>,
) -> Vec<PublicKey> {
    let mut keys = Vec::new();
    for entity in entities {
        for key in &entity.participants {
            if !keys.contains(key) {
                keys.push(*key);
            }
        }
    }
    keys
}
