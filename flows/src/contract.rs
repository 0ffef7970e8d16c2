//! Contract rules for request, reissue, reject, unlock and delete transactions.
//!
//! Every node checks a transaction here before signing it, and the initiator
//! checks its own transaction before any network activity. Asset-only
//! transactions get the generic rules: no protocol entities may be created
//! or consumed, and every participant of a consumed asset must sign.

use reissue_store::{AttachmentStore, StoreError};
use reissue_transactions::{
    validate_encumbrances, validate_structure, Command, CommandKind, Entity, EntityAndRef,
    EntityPayload, ReissuanceLock, ReissuanceRequest, TransactionError, WireTransaction,
};
use reissue_types::PublicKey;
use reissue_verification::{ProofVerifier, VerificationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("{0}")]
    Violation(String),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("exit proof rejected: {0}")]
    Proof(#[from] VerificationError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

fn violation<T>(reason: impl Into<String>) -> Result<T, ContractError> {
    Err(ContractError::Violation(reason.into()))
}

/// The protocol command a transaction carries, if any.
enum Protocol {
    Request,
    Reissue,
    Reject,
    Unlock,
    Delete,
}

/// Verify `tx` against the entities it consumes, in input order.
///
/// Unlock transactions also have their attached exit proofs checked, so
/// every attachment must already be in `attachments`.
pub fn verify_transaction(
    tx: &WireTransaction,
    inputs: &[EntityAndRef],
    attachments: &dyn AttachmentStore,
) -> Result<(), ContractError> {
    validate_structure(tx)?;
    validate_encumbrances(tx, inputs)?;

    match protocol_of(tx)? {
        Some(Protocol::Request) => verify_request(tx, inputs),
        Some(Protocol::Reissue) => verify_reissue(tx, inputs),
        Some(Protocol::Reject) => verify_reject(tx, inputs),
        Some(Protocol::Unlock) => verify_unlock(tx, inputs, attachments),
        Some(Protocol::Delete) => verify_delete(tx, inputs),
        None => verify_asset_only(tx, inputs),
    }
}

fn protocol_of(tx: &WireTransaction) -> Result<Option<Protocol>, ContractError> {
    let mut found = None;
    let mut create_lock = false;
    for command in &tx.commands {
        let protocol = match command.kind {
            CommandKind::CreateRequest => Protocol::Request,
            CommandKind::AcceptRequest => Protocol::Reissue,
            CommandKind::RejectRequest => Protocol::Reject,
            CommandKind::DeactivateLock => Protocol::Unlock,
            CommandKind::DeleteLock => Protocol::Delete,
            CommandKind::CreateLock => {
                create_lock = true;
                continue;
            }
            CommandKind::Asset(_) => continue,
        };
        if found.is_some() {
            return violation("more than one reissuance command");
        }
        found = Some(protocol);
    }
    if create_lock && !matches!(found, Some(Protocol::Reissue)) {
        return violation("locks are only created when accepting a request");
    }
    Ok(found)
}

fn command<'a>(tx: &'a WireTransaction, kind: &CommandKind) -> Result<&'a Command, ContractError> {
    match tx.commands.iter().find(|c| c.kind == *kind) {
        Some(c) => Ok(c),
        None => violation(format!("missing {kind} command")),
    }
}

fn require_signer(command: &Command, key: &PublicKey, who: &str) -> Result<(), ContractError> {
    if !command.signers.contains(key) {
        return violation(format!("{who} must sign {}", command.kind));
    }
    Ok(())
}

fn single_request(inputs: &[EntityAndRef]) -> Result<&ReissuanceRequest, ContractError> {
    match inputs {
        [only] => match only.entity.as_request() {
            Some(request) => Ok(request),
            None => violation("the consumed entity is not a reissuance request"),
        },
        _ => violation("exactly one reissuance request must be consumed"),
    }
}

fn no_protocol_outputs(tx: &WireTransaction) -> Result<(), ContractError> {
    if tx
        .outputs
        .iter()
        .any(|o| !matches!(o.payload, EntityPayload::Asset(_)))
    {
        return violation("unexpected request or lock output");
    }
    Ok(())
}

fn verify_request(tx: &WireTransaction, inputs: &[EntityAndRef]) -> Result<(), ContractError> {
    if !inputs.is_empty() {
        return violation("a request consumes nothing");
    }
    let request = match tx.outputs.as_slice() {
        [only] => match only.as_request() {
            Some(request) => request,
            None => return violation("a request transaction outputs a request"),
        },
        _ => return violation("a request transaction has exactly one output"),
    };
    if request.entity_refs.is_empty() {
        return violation("a request names at least one entity");
    }
    if request.required_signers.contains(&request.issuer.owning_key) {
        return violation("the issuer is an implicit signer");
    }
    require_signer(
        command(tx, &CommandKind::CreateRequest)?,
        &request.requester,
        "the requester",
    )
}

fn verify_reissue(tx: &WireTransaction, inputs: &[EntityAndRef]) -> Result<(), ContractError> {
    let request = single_request(inputs)?;
    let Some((lock_entity, copies)) = tx.outputs.split_last() else {
        return violation("a reissue transaction outputs copies and a lock");
    };
    let Some(lock) = lock_entity.as_lock() else {
        return violation("the last output of a reissue transaction is the lock");
    };
    if !lock.is_active() {
        return violation("a new lock is active");
    }
    if lock.issuer != request.issuer || lock.requester != request.requester {
        return violation("lock issuer and requester must match the request");
    }
    let snapshot: Vec<_> = lock.original_refs().collect();
    if snapshot != request.entity_refs {
        return violation("lock snapshot must be exactly the requested entities");
    }
    if copies.len() != lock.original_entities.len() {
        return violation("one copy per requested entity");
    }
    let lock_index = copies.len() as u32;
    for (copy, original) in copies.iter().zip(&lock.original_entities) {
        if !matches!(copy.payload, EntityPayload::Asset(_)) {
            return violation("only assets are re-issued");
        }
        if copy.payload != original.entity.payload
            || copy.participants != original.entity.participants
        {
            return violation(format!("copy of {} differs from the original", original.entity_ref));
        }
        if copy.encumbrance != Some(lock_index) {
            return violation("every copy is encumbered by the lock");
        }
    }
    if lock_entity.encumbrance.is_none() {
        return violation("the lock is encumbered by its copies");
    }

    let issuer = &request.issuer.owning_key;
    require_signer(command(tx, &CommandKind::AcceptRequest)?, issuer, "the issuer")?;
    let create = command(tx, &CommandKind::CreateLock)?;
    require_signer(create, issuer, "the issuer")?;
    require_signer(create, &request.requester, "the requester")?;
    let issuance = command(tx, &CommandKind::Asset(request.issuance_command.clone()))?;
    require_signer(issuance, issuer, "the issuer")?;
    require_signer(issuance, &request.requester, "the requester")?;
    Ok(())
}

fn verify_reject(tx: &WireTransaction, inputs: &[EntityAndRef]) -> Result<(), ContractError> {
    let request = single_request(inputs)?;
    if !tx.outputs.is_empty() {
        return violation("a rejection produces nothing");
    }
    require_signer(
        command(tx, &CommandKind::RejectRequest)?,
        &request.issuer.owning_key,
        "the issuer",
    )
}

/// The active lock among `inputs` and the copies it governs, by snapshot
/// position.
fn lock_and_copies(
    inputs: &[EntityAndRef],
) -> Result<(&ReissuanceLock, Vec<(usize, &Entity)>), ContractError> {
    let locks: Vec<&EntityAndRef> = inputs
        .iter()
        .filter(|i| i.entity.as_lock().is_some())
        .collect();
    let [lock_input] = *locks.as_slice() else {
        return violation("exactly one reissuance lock must be consumed");
    };
    let Some(lock) = lock_input.entity.as_lock() else {
        return violation("the consumed entity is not a reissuance lock");
    };
    if !lock.is_active() {
        return violation("the consumed lock is not active");
    }

    let lock_ref = lock_input.entity_ref;
    let mut copies = Vec::new();
    for input in inputs.iter().filter(|i| i.entity_ref != lock_ref) {
        let governed = input.entity_ref.tx_id == lock_ref.tx_id
            && input.entity.encumbrance == Some(lock_ref.index);
        if !governed {
            return violation(format!("{} is not governed by the lock", input.entity_ref));
        }
        copies.push((input.entity_ref.index as usize, &input.entity));
    }
    if copies.len() != lock.original_entities.len() {
        return violation("every governed copy must be consumed with the lock");
    }
    for (position, copy) in &copies {
        match lock.original_entities.get(*position) {
            Some(original) if original.entity.payload == copy.payload => {}
            _ => return violation("governed copy does not match the lock snapshot"),
        }
    }
    Ok((lock, copies))
}

fn verify_unlock(
    tx: &WireTransaction,
    inputs: &[EntityAndRef],
    attachments: &dyn AttachmentStore,
) -> Result<(), ContractError> {
    let (lock, _) = lock_and_copies(inputs)?;
    let Some((lock_out, plain)) = tx.outputs.split_last() else {
        return violation("an unlock outputs the released entities and the lock");
    };
    if lock_out.as_lock() != Some(&lock.deactivated()) || lock_out.encumbrance.is_some() {
        return violation("the lock must be re-emitted inactive and otherwise unchanged");
    }
    if plain.len() != lock.original_entities.len() {
        return violation("one released entity per governed copy");
    }
    for (out, original) in plain.iter().zip(&lock.original_entities) {
        if out.payload != original.entity.payload
            || out.participants != original.entity.participants
            || out.encumbrance.is_some()
        {
            return violation(format!(
                "released copy of {} differs from the original",
                original.entity_ref
            ));
        }
    }

    let deactivate = command(tx, &CommandKind::DeactivateLock)?;
    require_signer(deactivate, &lock.requester, "the requester")?;
    let signers = tx.required_signing_keys();
    if let Some(missing) = lock
        .extra_unlock_signers
        .iter()
        .find(|k| !signers.contains(*k))
    {
        return violation(format!("unlock signer {missing} is missing"));
    }

    if tx.attachments.is_empty() {
        return violation("an unlock carries its exit proofs");
    }
    let mut proofs = Vec::with_capacity(tx.attachments.len());
    for id in &tx.attachments {
        proofs.push((*id, attachments.open(id)?));
    }
    ProofVerifier::new(lock)?.verify_all(&proofs)?;
    Ok(())
}

fn verify_delete(tx: &WireTransaction, inputs: &[EntityAndRef]) -> Result<(), ContractError> {
    let (lock, _) = lock_and_copies(inputs)?;
    if !tx.outputs.is_empty() {
        return violation("a delete produces nothing");
    }
    require_signer(
        command(tx, &CommandKind::DeleteLock)?,
        &lock.requester,
        "the requester",
    )
}

fn verify_asset_only(tx: &WireTransaction, inputs: &[EntityAndRef]) -> Result<(), ContractError> {
    no_protocol_outputs(tx)?;
    let signers = tx.required_signing_keys();
    for input in inputs {
        if !matches!(input.entity.payload, EntityPayload::Asset(_)) {
            return violation(format!(
                "{} can only be consumed by a reissuance command",
                input.entity_ref
            ));
        }
        if let Some(missing) = input
            .entity
            .participants
            .iter()
            .find(|k| !signers.contains(*k))
        {
            return violation(format!("participant {missing} must sign"));
        }
    }
    Ok(())
}
