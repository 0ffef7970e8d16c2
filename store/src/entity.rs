//! Entity store (vault) trait.

use crate::StoreError;
use reissue_transactions::{Entity, EntityAndRef, LockStatus};
use reissue_types::{EntityRef, TxId};

/// Filter for queries over encumbered and unencumbered entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncumbranceFilter {
    All,
    Encumbered,
    Unencumbered,
}

impl EncumbranceFilter {
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::All => true,
            Self::Encumbered => entity.is_encumbered(),
            Self::Unencumbered => !entity.is_encumbered(),
        }
    }
}

/// Trait for the local entity store.
///
/// Queries only ever return unconsumed entities.
pub trait EntityStore: Send + Sync {
    /// Record a produced entity. If the ref is already known to be consumed
    /// the entity is remembered but never reported as live.
    fn put_entity(&self, entity: &EntityAndRef) -> Result<(), StoreError>;

    /// Record that `entity_ref` was consumed by transaction `by`.
    fn mark_consumed(&self, entity_ref: &EntityRef, by: &TxId) -> Result<(), StoreError>;

    /// The transaction that consumed `entity_ref`, if one has been recorded.
    fn consumed_by(&self, entity_ref: &EntityRef) -> Result<Option<TxId>, StoreError>;

    /// Resolve refs to live entities; `None` for unknown or consumed refs.
    fn resolve(&self, refs: &[EntityRef]) -> Result<Vec<Option<EntityAndRef>>, StoreError>;

    /// Live assets of a logical type.
    fn query_assets(
        &self,
        kind: &str,
        filter: EncumbranceFilter,
    ) -> Result<Vec<EntityAndRef>, StoreError>;

    /// Live reissuance requests.
    fn query_requests(&self) -> Result<Vec<EntityAndRef>, StoreError>;

    /// Live reissuance locks with the given status.
    fn query_locks(&self, status: LockStatus) -> Result<Vec<EntityAndRef>, StoreError>;

    /// Live ACTIVE locks whose snapshot contains `entity_ref`.
    ///
    /// Backed by an index kept up to date as locks are recorded and consumed.
    fn locks_governing(&self, entity_ref: &EntityRef) -> Result<Vec<EntityAndRef>, StoreError>;

    fn active_locks(&self) -> Result<Vec<EntityAndRef>, StoreError> {
        self.query_locks(LockStatus::Active)
    }
}
