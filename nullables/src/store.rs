//! Nullable stores: thread-safe in-memory storage for testing.

use reissue_crypto::hash_attachment;
use reissue_store::{
    AttachmentStore, EncumbranceFilter, EntityStore, StoreError, TransactionStore,
};
use reissue_transactions::{EntityAndRef, EntityPayload, LockStatus, SignedTransaction};
use reissue_types::{AttachmentId, EntityRef, TxId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

/// An in-memory vault.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullEntityStore {
    entities: Mutex<BTreeMap<EntityRef, EntityAndRef>>,
    consumed: Mutex<HashMap<EntityRef, TxId>>,
    /// Original entity ref -> refs of locks whose snapshot contains it.
    lock_index: Mutex<HashMap<EntityRef, BTreeSet<EntityRef>>>,
}

impl NullEntityStore {
    pub fn new() -> Self {
        Self {
            entities: Mutex::new(BTreeMap::new()),
            consumed: Mutex::new(HashMap::new()),
            lock_index: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live entities.
    pub fn live_count(&self) -> usize {
        let consumed = self.consumed.lock().unwrap();
        self.entities
            .lock()
            .unwrap()
            .keys()
            .filter(|r| !consumed.contains_key(r))
            .count()
    }

    fn live_where(&self, pred: impl Fn(&EntityAndRef) -> bool) -> Vec<EntityAndRef> {
        let consumed = self.consumed.lock().unwrap();
        self.entities
            .lock()
            .unwrap()
            .values()
            .filter(|e| !consumed.contains_key(&e.entity_ref) && pred(e))
            .cloned()
            .collect()
    }
}

impl Default for NullEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for NullEntityStore {
    fn put_entity(&self, entity: &EntityAndRef) -> Result<(), StoreError> {
        if let Some(lock) = entity.entity.as_lock() {
            let mut index = self.lock_index.lock().unwrap();
            for original in lock.original_refs() {
                index.entry(original).or_default().insert(entity.entity_ref);
            }
        }
        self.entities
            .lock()
            .unwrap()
            .insert(entity.entity_ref, entity.clone());
        Ok(())
    }

    fn mark_consumed(&self, entity_ref: &EntityRef, by: &TxId) -> Result<(), StoreError> {
        self.consumed.lock().unwrap().insert(*entity_ref, *by);
        Ok(())
    }

    fn consumed_by(&self, entity_ref: &EntityRef) -> Result<Option<TxId>, StoreError> {
        Ok(self.consumed.lock().unwrap().get(entity_ref).copied())
    }

    fn resolve(&self, refs: &[EntityRef]) -> Result<Vec<Option<EntityAndRef>>, StoreError> {
        let consumed = self.consumed.lock().unwrap();
        let entities = self.entities.lock().unwrap();
        Ok(refs
            .iter()
            .map(|r| {
                if consumed.contains_key(r) {
                    None
                } else {
                    entities.get(r).cloned()
                }
            })
            .collect())
    }

    fn query_assets(
        &self,
        kind: &str,
        filter: EncumbranceFilter,
    ) -> Result<Vec<EntityAndRef>, StoreError> {
        Ok(self.live_where(|e| {
            e.entity.as_asset().is_some_and(|a| a.kind == kind) && filter.matches(&e.entity)
        }))
    }

    fn query_requests(&self) -> Result<Vec<EntityAndRef>, StoreError> {
        Ok(self.live_where(|e| matches!(e.entity.payload, EntityPayload::Request(_))))
    }

    fn query_locks(&self, status: LockStatus) -> Result<Vec<EntityAndRef>, StoreError> {
        Ok(self.live_where(|e| e.entity.as_lock().is_some_and(|l| l.status == status)))
    }

    fn locks_governing(&self, entity_ref: &EntityRef) -> Result<Vec<EntityAndRef>, StoreError> {
        let candidates: Vec<EntityRef> = self
            .lock_index
            .lock()
            .unwrap()
            .get(entity_ref)
            .map(|refs| refs.iter().copied().collect())
            .unwrap_or_default();
        Ok(self
            .resolve(&candidates)?
            .into_iter()
            .flatten()
            .filter(|e| e.entity.as_lock().is_some_and(|l| l.is_active()))
            .collect())
    }
}

/// An in-memory transaction archive.
pub struct NullTransactionStore {
    transactions: Mutex<HashMap<TxId, SignedTransaction>>,
}

impl NullTransactionStore {
    pub fn new() -> Self {
        Self {
            transactions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore for NullTransactionStore {
    fn put_transaction(&self, tx: &SignedTransaction) -> Result<(), StoreError> {
        self.transactions
            .lock()
            .unwrap()
            .entry(tx.id)
            .or_insert_with(|| tx.clone());
        Ok(())
    }

    fn get_transaction(&self, id: &TxId) -> Result<SignedTransaction, StoreError> {
        self.transactions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn exists(&self, id: &TxId) -> Result<bool, StoreError> {
        Ok(self.transactions.lock().unwrap().contains_key(id))
    }

    fn transaction_count(&self) -> Result<u64, StoreError> {
        Ok(self.transactions.lock().unwrap().len() as u64)
    }
}

/// An in-memory content-addressed blob store.
pub struct NullAttachmentStore {
    blobs: Mutex<HashMap<AttachmentId, Vec<u8>>>,
}

impl NullAttachmentStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullAttachmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentStore for NullAttachmentStore {
    fn import(&self, blob: &[u8]) -> Result<AttachmentId, StoreError> {
        let id = hash_attachment(blob);
        self.blobs
            .lock()
            .unwrap()
            .entry(id)
            .or_insert_with(|| blob.to_vec());
        Ok(id)
    }

    fn open(&self, id: &AttachmentId) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn has(&self, id: &AttachmentId) -> Result<bool, StoreError> {
        Ok(self.blobs.lock().unwrap().contains_key(id))
    }
}
