//! Recording finalised transactions into the archive and the entity store.

use crate::error::LedgerError;
use reissue_store::{EntityStore, StoreError, TransactionStore};
use reissue_transactions::{EntityAndRef, SignedTransaction, WireTransaction};
use tracing::debug;

/// Append `stx` to the archive and apply it to the entity store.
///
/// Inputs are marked consumed before outputs are added, and the entity store
/// ignores outputs it already knows to be consumed, so transactions may be
/// recorded in any order. Returns `false` when the transaction was already
/// recorded.
pub fn record_transaction(
    archive: &dyn TransactionStore,
    vault: &dyn EntityStore,
    stx: &SignedTransaction,
) -> Result<bool, LedgerError> {
    if archive.exists(&stx.id)? {
        return Ok(false);
    }
    archive.put_transaction(stx)?;
    for input in &stx.tx.inputs {
        vault.mark_consumed(input, &stx.id)?;
    }
    for (index, entity) in stx.tx.outputs.iter().enumerate() {
        vault.put_entity(&EntityAndRef::new(entity.clone(), stx.out_ref(index as u32)))?;
    }
    debug!(
        tx_id = %stx.id,
        inputs = stx.tx.inputs.len(),
        outputs = stx.tx.outputs.len(),
        "transaction recorded"
    );
    Ok(true)
}

/// Resolve a transaction's inputs from the archive, consumed or not.
///
/// Used to check a proposed transaction against the entities it spends;
/// whether they are still unconsumed is the notary's call.
pub fn resolve_inputs(
    archive: &dyn TransactionStore,
    tx: &WireTransaction,
) -> Result<Vec<EntityAndRef>, LedgerError> {
    tx.inputs
        .iter()
        .map(|input| {
            let source = archive.get_transaction(&input.tx_id).map_err(|e| match e {
                StoreError::NotFound(_) => LedgerError::NotFound(input.tx_id),
                other => LedgerError::Storage(other),
            })?;
            let entity = source
                .tx
                .outputs
                .get(input.index as usize)
                .cloned()
                .ok_or(LedgerError::MissingOutput(*input))?;
            Ok(EntityAndRef::new(entity, *input))
        })
        .collect()
}
