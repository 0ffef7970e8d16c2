//! Well-known network identities.

use crate::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A well-known identity on the network: a legal name bound to an owning key.
///
/// A single counterparty node may control further keys besides its owning
/// key; the identity service maps those back to the `Party`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub owning_key: PublicKey,
}

impl Party {
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Self {
        Self {
            name: name.into(),
            owning_key,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
