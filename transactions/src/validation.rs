//! Transaction validation logic.

use crate::entity::EntityAndRef;
use crate::error::TransactionError;
use crate::transaction::WireTransaction;
use reissue_types::EntityRef;
use std::collections::HashSet;

/// Validate a transaction's basic structure (commands, inputs, encumbrances, notary).
///
/// This performs stateless validation only. Checks that need the consumed
/// entities live in [`validate_encumbrances`] and in the contract rules.
pub fn validate_structure(tx: &WireTransaction) -> Result<(), TransactionError> {
    if tx.commands.is_empty() {
        return Err(TransactionError::NoCommands);
    }
    for command in &tx.commands {
        if command.signers.is_empty() {
            return Err(TransactionError::EmptySignerSet(command.kind.to_string()));
        }
    }

    let mut seen = HashSet::new();
    for input in &tx.inputs {
        if !seen.insert(*input) {
            return Err(TransactionError::DuplicateInput(*input));
        }
    }

    let mut attachments = HashSet::new();
    for id in &tx.attachments {
        if !attachments.insert(*id) {
            return Err(TransactionError::DuplicateAttachment(*id));
        }
    }

    let output_count = tx.outputs.len() as u32;
    for (index, output) in tx.outputs.iter().enumerate() {
        let index = index as u32;
        if let Some(encumbrance) = output.encumbrance {
            if encumbrance >= output_count || encumbrance == index {
                return Err(TransactionError::EncumbranceOutOfRange { index, encumbrance });
            }
        }
        if output.notary != tx.notary {
            return Err(TransactionError::NotaryMismatch { index });
        }
    }

    Ok(())
}

/// Check that every encumbered input is consumed together with its encumbrance.
///
/// `inputs` must be the resolved entities for `tx.inputs`, in the same order.
pub fn validate_encumbrances(
    tx: &WireTransaction,
    inputs: &[EntityAndRef],
) -> Result<(), TransactionError> {
    if inputs.len() != tx.inputs.len() {
        return Err(TransactionError::InputCountMismatch {
            declared: tx.inputs.len(),
            resolved: inputs.len(),
        });
    }
    let consumed: HashSet<EntityRef> = tx.inputs.iter().copied().collect();
    for (declared, resolved) in tx.inputs.iter().zip(inputs) {
        if *declared != resolved.entity_ref {
            return Err(TransactionError::InputMismatch(resolved.entity_ref));
        }
        if let Some(encumbrance) = resolved.entity.encumbrance {
            let partner = EntityRef::new(declared.tx_id, encumbrance);
            if !consumed.contains(&partner) {
                return Err(TransactionError::EncumbranceNotConsumed {
                    input: *declared,
                    encumbrance: partner,
                });
            }
        }
    }
    Ok(())
}
