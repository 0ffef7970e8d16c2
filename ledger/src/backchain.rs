//! Back-chain resolution: which transactions a transaction's provenance rests on.
//!
//! The walk is an explicit frontier queue plus visited set over the
//! "consumes" relation. Merge/split histories (diamonds) visit each
//! transaction once; deep chains cost heap, not stack.

use crate::error::LedgerError;
use reissue_store::{StoreError, TransactionStore};
use reissue_transactions::SignedTransaction;
use reissue_types::TxId;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Trait abstracting transaction lookup by id.
///
/// Implementations can read from the archive, an in-memory map, or test fixtures.
pub trait TransactionLookup {
    /// Look up a transaction; `Ok(None)` when it is not held locally.
    fn lookup(&self, id: &TxId) -> Result<Option<SignedTransaction>, StoreError>;
}

impl TransactionLookup for dyn TransactionStore + '_ {
    fn lookup(&self, id: &TxId) -> Result<Option<SignedTransaction>, StoreError> {
        match self.get_transaction(id) {
            Ok(tx) => Ok(Some(tx)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl TransactionLookup for HashMap<TxId, SignedTransaction> {
    fn lookup(&self, id: &TxId) -> Result<Option<SignedTransaction>, StoreError> {
        Ok(self.get(id).cloned())
    }
}

/// Resolves the transitive ancestor set of transactions.
pub struct BackchainResolver<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L: TransactionLookup + ?Sized> BackchainResolver<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// All transactions `id` transitively consumes from, `id` included.
    ///
    /// Fails with [`LedgerError::NotFound`] naming the first ancestor that is
    /// not held locally.
    pub fn ancestors_of(&self, id: &TxId) -> Result<HashSet<TxId>, LedgerError> {
        self.ancestors_of_all(std::slice::from_ref(id))
    }

    /// Union of [`Self::ancestors_of`] over several starting points.
    pub fn ancestors_of_all(&self, ids: &[TxId]) -> Result<HashSet<TxId>, LedgerError> {
        let arena = self.walk(ids)?;
        Ok(arena.into_iter().map(|tx| tx.id).collect())
    }

    /// The back-chain of `ids` as transactions, parents before children.
    ///
    /// A receiver can record the result front to back and every input will
    /// already be known when its consumer arrives.
    pub fn collect_backchain(&self, ids: &[TxId]) -> Result<Vec<SignedTransaction>, LedgerError> {
        let arena = self.walk(ids)?;
        let index: HashMap<TxId, usize> = arena
            .iter()
            .enumerate()
            .map(|(i, tx)| (tx.id, i))
            .collect();

        // Kahn's algorithm over the arena: indegree = distinct parents.
        let mut indegree = vec![0usize; arena.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); arena.len()];
        for (i, tx) in arena.iter().enumerate() {
            let parents: HashSet<TxId> = tx.tx.inputs.iter().map(|r| r.tx_id).collect();
            for parent in parents {
                if let Some(&p) = index.get(&parent) {
                    children[p].push(i);
                    indegree[i] += 1;
                }
            }
        }

        let mut ready: VecDeque<usize> = (0..arena.len()).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(arena.len());
        while let Some(i) = ready.pop_front() {
            order.push(i);
            for &child in &children[i] {
                indegree[child] -= 1;
                if indegree[child] == 0 {
                    ready.push_back(child);
                }
            }
        }

        let mut slots: Vec<Option<SignedTransaction>> = arena.into_iter().map(Some).collect();
        Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
    }

    /// Breadth-first walk; returns every reached transaction exactly once.
    fn walk(&self, ids: &[TxId]) -> Result<Vec<SignedTransaction>, LedgerError> {
        let mut visited: HashSet<TxId> = HashSet::new();
        let mut frontier: VecDeque<TxId> = ids.iter().copied().collect();
        let mut arena = Vec::new();

        while let Some(id) = frontier.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let tx = self.lookup.lookup(&id)?.ok_or(LedgerError::NotFound(id))?;
            for input in &tx.tx.inputs {
                if !visited.contains(&input.tx_id) {
                    frontier.push_back(input.tx_id);
                }
            }
            arena.push(tx);
        }

        debug!(roots = ids.len(), resolved = arena.len(), "back-chain resolved");
        Ok(arena)
    }
}
