//! Handles to produced entity instances.

use crate::TxId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable pointer to one output of one transaction.
///
/// Two refs are equal only if they name the same output of the same
/// transaction. Payload equality of the entities behind them is irrelevant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub tx_id: TxId,
    pub index: u32,
}

impl EntityRef {
    pub fn new(tx_id: TxId, index: u32) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityRef({:?}, {})", self.tx_id, self.index)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tx_id, self.index)
    }
}
