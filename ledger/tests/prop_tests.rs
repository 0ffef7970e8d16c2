use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use reissue_ledger::BackchainResolver;
use reissue_transactions::{
    AssetData, Command, Entity, EntityPayload, SignedTransaction, WireTransaction,
};
use reissue_types::{Party, PublicKey, TxId};

fn notary() -> Party {
    Party::new("Notary", PublicKey([9u8; 32]))
}

/// Build a random DAG: transaction `i` consumes one output of each chosen
/// earlier transaction. Every transaction has enough outputs for all children.
fn build_dag(parents: &[Vec<usize>]) -> Vec<SignedTransaction> {
    let owner = PublicKey([1u8; 32]);
    let fanout = parents.len().max(1);
    let mut txs: Vec<SignedTransaction> = Vec::with_capacity(parents.len());
    let mut next_output = vec![0u32; parents.len()];
    for (i, chosen) in parents.iter().enumerate() {
        let mut tx = WireTransaction::new(notary()).with_command(Command::asset("Move", [owner]));
        let mut unique: Vec<usize> = chosen.iter().copied().filter(|&p| p < i).collect();
        unique.sort_unstable();
        unique.dedup();
        for p in unique {
            tx = tx.with_input(txs[p].out_ref(next_output[p]));
            next_output[p] += 1;
        }
        for o in 0..fanout {
            tx = tx.with_output(Entity::new(
                EntityPayload::Asset(AssetData::new("Token", vec![o as u8])),
                vec![owner],
                notary(),
            ));
        }
        txs.push(SignedTransaction::new(tx));
    }
    txs
}

/// Reachability by index, computed independently of the resolver.
fn reachable(txs: &[SignedTransaction], from: usize) -> HashSet<TxId> {
    let by_id: HashMap<TxId, usize> = txs.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
    let mut seen = HashSet::new();
    let mut stack = vec![from];
    while let Some(i) = stack.pop() {
        if seen.insert(txs[i].id) {
            for input in &txs[i].tx.inputs {
                stack.push(by_id[&input.tx_id]);
            }
        }
    }
    seen
}

proptest! {
    /// The resolver returns exactly the reachable set, for any DAG shape.
    #[test]
    fn ancestors_match_reachability(
        parents in prop::collection::vec(prop::collection::vec(0usize..24, 0..4), 1..24)
    ) {
        let txs = build_dag(&parents);
        let map: HashMap<TxId, SignedTransaction> =
            txs.iter().map(|t| (t.id, t.clone())).collect();
        let last = txs.len() - 1;
        let ancestors = BackchainResolver::new(&map).ancestors_of(&txs[last].id).unwrap();
        prop_assert_eq!(ancestors, reachable(&txs, last));
    }

    /// The collected back-chain lists each ancestor once, parents first.
    #[test]
    fn backchain_is_topologically_ordered(
        parents in prop::collection::vec(prop::collection::vec(0usize..16, 0..3), 1..16)
    ) {
        let txs = build_dag(&parents);
        let map: HashMap<TxId, SignedTransaction> =
            txs.iter().map(|t| (t.id, t.clone())).collect();
        let last = txs.len() - 1;
        let ordered = BackchainResolver::new(&map).collect_backchain(&[txs[last].id]).unwrap();
        let position: HashMap<TxId, usize> =
            ordered.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
        prop_assert_eq!(position.len(), ordered.len());
        for tx in &ordered {
            for input in &tx.tx.inputs {
                prop_assert!(position[&input.tx_id] < position[&tx.id]);
            }
        }
    }
}
