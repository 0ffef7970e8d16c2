//! Identity resolution and local key management.

use crate::NetworkError;
use reissue_transactions::TransactionSignature;
use reissue_types::{Party, PublicKey, TxId};

/// Maps keys to the well-known party that controls them.
pub trait IdentityService: Send + Sync {
    /// The party controlling `key`, if known.
    fn well_known_party(&self, key: &PublicKey) -> Option<Party>;

}

/// Keys held by this node.
pub trait KeyManager: Send + Sync {
    fn owns(&self, key: &PublicKey) -> bool;

    /// Sign a transaction id with a held key.
    fn sign(&self, key: &PublicKey, id: &TxId) -> Result<TransactionSignature, NetworkError>;
}
