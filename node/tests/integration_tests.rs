//! End-to-end reissuance across several in-process nodes:
//! issue → request → accept → exit → unlock → move, plus the failure paths.
//!
//! Every node runs its own vault and archive; sessions between them are
//! answered by spawned responders, and a single notary finalises every
//! transaction.

use reissue_crypto::hash_attachment;
use reissue_flows::asset::proof_blob;
use reissue_flows::{
    AcceptReissuanceConfig, DeleteConfig, ReissuanceError, RequestReissuanceConfig,
};
use reissue_node::{MockNetwork, NodeConfig, NotaryConfig, ReissueNode};
use reissue_store::EncumbranceFilter;
use reissue_transactions::{
    AssetData, Command, CommandKind, Entity, EntityAndRef, EntityPayload, LockStatus,
    SignedTransaction, TransactionSignature, WireTransaction,
};
use reissue_types::{KeyPair, TxId};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TOKEN: &str = "Token";

fn network() -> MockNetwork {
    reissue_utils::init_test_tracing();
    MockNetwork::new(NotaryConfig::default()).expect("notary")
}

fn node(network: &MockNetwork, name: &str) -> ReissueNode {
    network.create_node(NodeConfig::new(name)).expect("node")
}

fn keys_of(node: &ReissueNode) -> KeyPair {
    node.config.keypair().expect("keys")
}

fn assets(node: &ReissueNode, filter: EncumbranceFilter) -> Vec<EntityAndRef> {
    node.assets(TOKEN, filter).expect("query")
}

fn live(node: &ReissueNode, stx: &SignedTransaction, index: u32) -> EntityAndRef {
    node.services()
        .entities
        .resolve(&[stx.out_ref(index)])
        .expect("resolve")
        .remove(0)
        .expect("output is live")
}

async fn issue_to(issuer: &ReissueNode, holder: &ReissueNode, data: &[u8]) -> EntityAndRef {
    let stx = issuer
        .issue_asset(AssetData::new(TOKEN, data.to_vec()), holder.party())
        .await
        .expect("issue");
    live(holder, &stx, 0)
}

fn request_config(
    issuer: &ReissueNode,
    requester: &ReissueNode,
    originals: &[&EntityAndRef],
) -> RequestReissuanceConfig {
    RequestReissuanceConfig::new(
        issuer.party().clone(),
        requester.party().owning_key,
        originals.iter().map(|o| o.entity_ref).collect(),
        "Issue",
    )
}

/// Request and accept; returns (request tx, reissue tx).
async fn reissue(
    issuer: &ReissueNode,
    requester: &ReissueNode,
    originals: &[&EntityAndRef],
) -> (SignedTransaction, SignedTransaction) {
    let request_tx = requester
        .request_reissuance(request_config(issuer, requester, originals))
        .await
        .expect("request");
    let request = live(issuer, &request_tx, 0);
    let reissue_tx = issuer
        .accept_and_reissue(AcceptReissuanceConfig::new(request))
        .await
        .expect("accept");
    (request_tx, reissue_tx)
}

/// An exit of `asset` signed by its holder but never notarised.
fn unnotarised_exit(holder: &ReissueNode, notary: &MockNetwork, asset: &EntityAndRef) -> Vec<u8> {
    use reissue_consensus::NotaryService;
    let keys = keys_of(holder);
    let tx = WireTransaction::new(notary.notary().notary_identity())
        .with_input(asset.entity_ref)
        .with_command(Command::asset("Exit", [keys.public]));
    let mut stx = SignedTransaction::new(tx);
    stx.add_signature(TransactionSignature::sign(&stx.id, keys.public, &keys.private));
    proof_blob(&stx).expect("encode")
}

// ---------------------------------------------------------------------------
// Accept
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accept_yields_one_active_lock_and_one_encumbered_copy() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;

    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;

    assert_eq!(alice.locks(LockStatus::Active).unwrap().len(), 1);
    let copies = assets(&alice, EncumbranceFilter::Encumbered);
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].entity.payload, original.entity.payload);
    assert_eq!(copies[0].entity_ref, reissue_tx.out_ref(0));
    assert!(reissue_tx
        .tx
        .outputs
        .iter()
        .all(|output| output.is_encumbered()));
    // The only free token is still the original.
    let free = assets(&alice, EncumbranceFilter::Unencumbered);
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].entity_ref, original.entity_ref);
    // The issuer holds the same view of the lock.
    assert_eq!(issuer.locks(LockStatus::Active).unwrap().len(), 1);
}

#[tokio::test]
async fn second_accept_on_the_same_entity_is_already_reissued() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let (_, first) = reissue(&issuer, &alice, &[&original]).await;

    let request_tx = alice
        .request_reissuance(request_config(&issuer, &alice, &[&original]))
        .await
        .expect("a second request is allowed");
    let request = live(&issuer, &request_tx, 0);
    match issuer
        .accept_and_reissue(AcceptReissuanceConfig::new(request))
        .await
    {
        Err(ReissuanceError::AlreadyReissued { entity_ref, lock }) => {
            assert_eq!(entity_ref, original.entity_ref);
            assert_eq!(lock, first.out_ref(1));
        }
        other => panic!("expected AlreadyReissued, got {other:?}"),
    }
    assert_eq!(alice.locks(LockStatus::Active).unwrap().len(), 1);
}

#[tokio::test]
async fn only_the_named_issuer_may_accept() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let request_tx = alice
        .request_reissuance(request_config(&issuer, &alice, &[&original]))
        .await
        .unwrap();

    let request = live(&alice, &request_tx, 0);
    assert!(matches!(
        alice
            .accept_and_reissue(AcceptReissuanceConfig::new(request))
            .await,
        Err(ReissuanceError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn issuer_as_extra_signer_fails_before_any_network_activity() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let before = alice.services().transactions.transaction_count().unwrap();
    let issuer_before = issuer.services().transactions.transaction_count().unwrap();

    let config = request_config(&issuer, &alice, &[&original])
        .with_extra_signers(vec![issuer.party().owning_key]);
    assert!(matches!(
        alice.request_reissuance(config).await,
        Err(ReissuanceError::InvalidArgument(_))
    ));
    assert_eq!(alice.services().transactions.transaction_count().unwrap(), before);
    assert_eq!(
        issuer.services().transactions.transaction_count().unwrap(),
        issuer_before
    );
}

// ---------------------------------------------------------------------------
// Request history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issuer_without_history_cannot_accept() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let bob = node(&net, "Bob");
    let original = issue_to(&issuer, &alice, b"100").await;
    let moved = alice.move_asset(&original, bob.party()).await.unwrap();
    let held = live(&bob, &moved, 0);

    let request_tx = bob
        .request_reissuance(request_config(&issuer, &bob, &[&held]))
        .await
        .unwrap();
    let request = live(&issuer, &request_tx, 0);
    assert!(matches!(
        issuer
            .accept_and_reissue(AcceptReissuanceConfig::new(request))
            .await,
        Err(ReissuanceError::InvalidArgument(_))
    ));
    assert!(issuer.locks(LockStatus::Active).unwrap().is_empty());
}

#[tokio::test]
async fn shared_history_lets_the_issuer_accept() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let bob = node(&net, "Bob");
    let original = issue_to(&issuer, &alice, b"100").await;
    let moved = alice.move_asset(&original, bob.party()).await.unwrap();
    let held = live(&bob, &moved, 0);

    let request_tx = bob
        .request(request_config(&issuer, &bob, &[&held]))
        .await
        .unwrap();
    assert!(issuer.transaction(&moved.id).is_ok());

    let request = live(&issuer, &request_tx, 0);
    issuer
        .accept_and_reissue(AcceptReissuanceConfig::new(request))
        .await
        .expect("accept with shared history");
    assert_eq!(bob.locks(LockStatus::Active).unwrap().len(), 1);
    assert_eq!(assets(&bob, EncumbranceFilter::Encumbered).len(), 1);
}

// ---------------------------------------------------------------------------
// Reject
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_request_leaves_the_original_spendable() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let bob = node(&net, "Bob");
    let original = issue_to(&issuer, &alice, b"100").await;
    let request_tx = alice
        .request_reissuance(request_config(&issuer, &alice, &[&original]))
        .await
        .unwrap();

    issuer
        .reject_request(live(&issuer, &request_tx, 0))
        .await
        .expect("reject");

    assert!(alice.requests().unwrap().is_empty());
    assert!(alice.locks(LockStatus::Active).unwrap().is_empty());
    assert!(assets(&alice, EncumbranceFilter::Encumbered).is_empty());
    let moved = alice.move_asset(&original, bob.party()).await.unwrap();
    assert_eq!(assets(&bob, EncumbranceFilter::Unencumbered)[0].entity_ref, moved.out_ref(0));
}

// ---------------------------------------------------------------------------
// Unlock
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unlocked_copy_carries_only_post_reissuance_provenance() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let carol = node(&net, "Carol");
    let original = issue_to(&issuer, &alice, b"100").await;
    let (request_tx, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;
    let copy = live(&alice, &reissue_tx, 0);
    let lock = live(&alice, &reissue_tx, 1);

    let exit = alice.exit_asset(&original).await.unwrap();
    let proof = alice.import_exit_proof(&exit).unwrap();
    let unlock_tx = alice
        .unlock_reissued_entities(alice.unlock_config(lock, vec![copy], vec![proof], "Unlock"))
        .await
        .expect("unlock");

    assert!(alice.locks(LockStatus::Active).unwrap().is_empty());
    assert_eq!(alice.locks(LockStatus::Inactive).unwrap().len(), 1);
    assert_eq!(issuer.locks(LockStatus::Inactive).unwrap().len(), 1);
    let freed = live(&alice, &unlock_tx, 0);
    assert!(!freed.entity.is_encumbered());
    assert_eq!(freed.entity.payload, original.entity.payload);

    let moved = alice.move_asset(&freed, carol.party()).await.unwrap();
    let expected: HashSet<TxId> = [moved.id, unlock_tx.id, reissue_tx.id, request_tx.id]
        .into_iter()
        .collect();
    assert_eq!(carol.ancestors_of(&moved.id).unwrap(), expected);
    assert!(carol.transaction(&exit.id).is_err());
}

#[tokio::test]
async fn proof_consuming_a_look_alike_is_refused() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let twin = issue_to(&issuer, &alice, b"100").await;
    assert_eq!(original.entity.payload, twin.entity.payload);
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;

    let exit = alice.exit_asset(&twin).await.unwrap();
    let proof = alice.import_exit_proof(&exit).unwrap();
    let config = alice.unlock_config(
        live(&alice, &reissue_tx, 1),
        vec![live(&alice, &reissue_tx, 0)],
        vec![proof],
        "Unlock",
    );
    assert!(matches!(
        alice.unlock_reissued_entities(config).await,
        Err(ReissuanceError::VerificationFailed(_))
    ));
    assert_eq!(alice.locks(LockStatus::Active).unwrap().len(), 1);
}

#[tokio::test]
async fn unnotarised_proof_is_refused() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;

    let proof = alice
        .import_proof(&unnotarised_exit(&alice, &net, &original))
        .unwrap();
    let config = alice.unlock_config(
        live(&alice, &reissue_tx, 1),
        vec![live(&alice, &reissue_tx, 0)],
        vec![proof],
        "Unlock",
    );
    assert!(matches!(
        alice.unlock_reissued_entities(config).await,
        Err(ReissuanceError::VerificationFailed(_))
    ));
    assert_eq!(alice.locks(LockStatus::Active).unwrap().len(), 1);
    assert_eq!(assets(&alice, EncumbranceFilter::Encumbered).len(), 1);
}

#[tokio::test]
async fn unlock_names_a_proof_that_was_never_imported() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;

    let config = alice.unlock_config(
        live(&alice, &reissue_tx, 1),
        vec![live(&alice, &reissue_tx, 0)],
        vec![hash_attachment(b"not imported")],
        "Unlock",
    );
    assert!(matches!(
        alice.unlock_reissued_entities(config).await,
        Err(ReissuanceError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn a_lock_unlocks_once() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;
    let copy = live(&alice, &reissue_tx, 0);
    let lock = live(&alice, &reissue_tx, 1);
    let exit = alice.exit_asset(&original).await.unwrap();
    let proof = alice.import_exit_proof(&exit).unwrap();

    alice
        .unlock_reissued_entities(alice.unlock_config(
            lock.clone(),
            vec![copy.clone()],
            vec![proof],
            "Unlock",
        ))
        .await
        .unwrap();
    assert!(matches!(
        alice
            .unlock_reissued_entities(alice.unlock_config(lock, vec![copy], vec![proof], "Unlock"))
            .await,
        Err(ReissuanceError::InvalidArgument(_))
    ));
}

/// A notarised transaction that breaks the unlock contract is refused by
/// the observer it is sent to.
#[tokio::test]
async fn observer_refuses_a_notarised_unlock_that_inflates_the_copy() {
    use reissue_consensus::NotaryService;
    use reissue_messages::SessionMessage;
    use reissue_network::{CounterpartySession, Messaging, NetworkError};

    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;
    let copy = live(&alice, &reissue_tx, 0);
    let lock = live(&alice, &reissue_tx, 1);
    let state = lock.entity.as_lock().expect("lock").clone();

    let keys = keys_of(&alice);
    let notary = net.notary().notary_identity();
    let inflated = EntityPayload::Asset(AssetData::new(TOKEN, b"999999".to_vec()));
    let tx = WireTransaction::new(notary.clone())
        .with_input(copy.entity_ref)
        .with_input(lock.entity_ref)
        .with_output(Entity {
            payload: inflated.clone(),
            encumbrance: None,
            ..copy.entity.clone()
        })
        .with_output(Entity::new(
            EntityPayload::Lock(state.deactivated()),
            lock.entity.participants.clone(),
            notary,
        ))
        .with_command(Command::new(CommandKind::DeactivateLock, [keys.public]))
        .with_command(Command::asset("Unlock", [keys.public]));
    let mut forged = SignedTransaction::new(tx);
    forged.add_signature(TransactionSignature::sign(&forged.id, keys.public, &keys.private));
    let notary_signature = net.notary().notarise(&forged).await.expect("notarised");
    forged.add_signature(notary_signature);

    let mut session = alice
        .services()
        .messaging
        .open_session(issuer.party())
        .await
        .expect("session");
    session
        .send_expecting_ack(SessionMessage::Role { signer: false })
        .await
        .expect("role");
    assert!(matches!(
        session
            .send_expecting_ack(SessionMessage::Finalised(forged.clone()))
            .await,
        Err(NetworkError::Rejected { .. })
    ));

    assert!(issuer.transaction(&forged.id).is_err());
    assert_eq!(issuer.locks(LockStatus::Active).unwrap().len(), 1);
    assert!(assets(&issuer, EncumbranceFilter::Unencumbered)
        .iter()
        .all(|free| free.entity.payload != inflated));
}

#[tokio::test]
async fn issuer_signs_unlocks_when_configured() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = net
        .create_node(NodeConfig {
            issuer_signs_unlocks: true,
            ..NodeConfig::new("Alice")
        })
        .unwrap();
    let original = issue_to(&issuer, &alice, b"100").await;
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;
    let exit = alice.exit_asset(&original).await.unwrap();
    let proof = alice.import_exit_proof(&exit).unwrap();

    let unlock_tx = alice
        .unlock_reissued_entities(alice.unlock_config(
            live(&alice, &reissue_tx, 1),
            vec![live(&alice, &reissue_tx, 0)],
            vec![proof],
            "Unlock",
        ))
        .await
        .expect("unlock co-signed by the issuer");
    assert!(unlock_tx.is_signed_by(&issuer.party().owning_key));
}

#[tokio::test]
async fn extra_unlock_signers_must_sign() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let bob = node(&net, "Bob");
    let original = issue_to(&issuer, &alice, b"100").await;
    let request_tx = alice
        .request_reissuance(request_config(&issuer, &alice, &[&original]))
        .await
        .unwrap();
    let reissue_tx = issuer
        .accept_and_reissue(
            AcceptReissuanceConfig::new(live(&issuer, &request_tx, 0))
                .with_unlock_signers(vec![bob.party().owning_key]),
        )
        .await
        .unwrap();
    let exit = alice.exit_asset(&original).await.unwrap();
    let proof = alice.import_exit_proof(&exit).unwrap();

    let unlock_tx = alice
        .unlock_reissued_entities(alice.unlock_config(
            live(&alice, &reissue_tx, 1),
            vec![live(&alice, &reissue_tx, 0)],
            vec![proof],
            "Unlock",
        ))
        .await
        .expect("unlock co-signed by bob");
    assert!(unlock_tx.is_signed_by(&bob.party().owning_key));
}

// ---------------------------------------------------------------------------
// Delete and encumbrance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_consumes_copies_and_lock() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let original = issue_to(&issuer, &alice, b"100").await;
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;

    let delete_tx = alice
        .delete_reissued_entities_and_lock(DeleteConfig::new(
            live(&alice, &reissue_tx, 1),
            vec![live(&alice, &reissue_tx, 0)],
            "Exit",
        ))
        .await
        .expect("delete");

    assert!(delete_tx.tx.outputs.is_empty());
    for node in [&alice, &issuer] {
        assert!(node.locks(LockStatus::Active).unwrap().is_empty());
        assert!(node.locks(LockStatus::Inactive).unwrap().is_empty());
        assert!(assets(node, EncumbranceFilter::Encumbered).is_empty());
    }
    assert_eq!(
        assets(&alice, EncumbranceFilter::Unencumbered)[0].entity_ref,
        original.entity_ref
    );
}

#[tokio::test]
async fn encumbered_copy_cannot_move_without_its_lock() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let bob = node(&net, "Bob");
    let original = issue_to(&issuer, &alice, b"100").await;
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&original]).await;

    let copy = live(&alice, &reissue_tx, 0);
    assert!(matches!(
        alice.move_asset(&copy, bob.party()).await,
        Err(ReissuanceError::VerificationFailed(_))
    ));
    assert!(assets(&bob, EncumbranceFilter::All).is_empty());
}

#[tokio::test]
async fn several_entities_reissue_under_one_lock() {
    let net = network();
    let issuer = node(&net, "Issuer");
    let alice = node(&net, "Alice");
    let first = issue_to(&issuer, &alice, b"1").await;
    let second = issue_to(&issuer, &alice, b"2").await;
    let (_, reissue_tx) = reissue(&issuer, &alice, &[&first, &second]).await;

    let lock = live(&alice, &reissue_tx, 2);
    let state = lock.entity.as_lock().unwrap();
    assert_eq!(state.original_entities.len(), 2);
    assert_eq!(lock.entity.encumbrance, Some(0));
    for index in 0..2 {
        assert_eq!(live(&alice, &reissue_tx, index).entity.encumbrance, Some(2));
    }

    let first_exit = alice.exit_asset(&first).await.unwrap();
    let second_exit = alice.exit_asset(&second).await.unwrap();
    let proofs = vec![
        alice.import_exit_proof(&first_exit).unwrap(),
        alice.import_exit_proof(&second_exit).unwrap(),
    ];
    // One proof short fails as a whole.
    let partial = alice.unlock_config(
        lock.clone(),
        vec![live(&alice, &reissue_tx, 0), live(&alice, &reissue_tx, 1)],
        proofs[..1].to_vec(),
        "Unlock",
    );
    assert!(matches!(
        alice.unlock_reissued_entities(partial).await,
        Err(ReissuanceError::VerificationFailed(_))
    ));

    let unlock_tx = alice
        .unlock_reissued_entities(alice.unlock_config(
            lock,
            vec![live(&alice, &reissue_tx, 1), live(&alice, &reissue_tx, 0)],
            proofs,
            "Unlock",
        ))
        .await
        .expect("unlock both");
    assert_eq!(assets(&alice, EncumbranceFilter::Unencumbered).len(), 2);
    assert_eq!(unlock_tx.tx.outputs.len(), 3);
}

#[tokio::test]
async fn node_names_are_unique_on_a_network() {
    let net = network();
    let _alice = node(&net, "Alice");
    assert!(net.create_node(NodeConfig::new("Alice")).is_err());
}
