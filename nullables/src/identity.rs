//! Nullable identity service and key manager.

use reissue_network::{IdentityService, KeyManager, NetworkError};
use reissue_transactions::TransactionSignature;
use reissue_types::{KeyPair, Party, PrivateKey, PublicKey, TxId};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory network map shared by every node of a test network.
pub struct NullIdentityService {
    parties: Mutex<HashMap<PublicKey, Party>>,
}

impl NullIdentityService {
    pub fn new() -> Self {
        Self {
            parties: Mutex::new(HashMap::new()),
        }
    }

    /// Publish a party under its owning key.
    pub fn register_party(&self, party: &Party) {
        self.register_key(party, party.owning_key);
    }

    /// Record that `party` also controls `key`.
    pub fn register_key(&self, party: &Party, key: PublicKey) {
        self.parties.lock().unwrap().insert(key, party.clone());
    }
}

impl Default for NullIdentityService {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityService for NullIdentityService {
    fn well_known_party(&self, key: &PublicKey) -> Option<Party> {
        self.parties.lock().unwrap().get(key).cloned()
    }
}

/// An in-memory key manager.
pub struct NullKeyManager {
    keys: Mutex<HashMap<PublicKey, PrivateKey>>,
}

impl NullKeyManager {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_keypair(keypair: KeyPair) -> Self {
        let manager = Self::new();
        manager.insert(keypair);
        manager
    }

    pub fn insert(&self, keypair: KeyPair) {
        self.keys
            .lock()
            .unwrap()
            .insert(keypair.public, keypair.private);
    }
}

impl Default for NullKeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyManager for NullKeyManager {
    fn owns(&self, key: &PublicKey) -> bool {
        self.keys.lock().unwrap().contains_key(key)
    }

    fn sign(&self, key: &PublicKey, id: &TxId) -> Result<TransactionSignature, NetworkError> {
        let keys = self.keys.lock().unwrap();
        let private = keys.get(key).ok_or(NetworkError::KeyNotOwned(*key))?;
        Ok(TransactionSignature::sign(id, *key, private))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reissue_crypto::keypair_from_seed;

    #[test]
    fn every_registered_key_maps_to_its_party() {
        let identities = NullIdentityService::new();
        let alice = Party::new("Alice", PublicKey([1u8; 32]));
        identities.register_party(&alice);
        identities.register_key(&alice, PublicKey([2u8; 32]));

        assert_eq!(
            identities.well_known_party(&PublicKey([2u8; 32])),
            Some(alice)
        );
        assert!(identities.well_known_party(&PublicKey([3u8; 32])).is_none());
    }

    #[test]
    fn signs_only_with_held_keys() {
        let kp = keypair_from_seed(&[4u8; 32]);
        let public = kp.public;
        let keys = NullKeyManager::with_keypair(kp);
        let id = TxId::new([8u8; 32]);

        let sig = keys.sign(&public, &id).unwrap();
        assert!(sig.verify(&id));
        assert!(matches!(
            keys.sign(&PublicKey([5u8; 32]), &id),
            Err(NetworkError::KeyNotOwned(_))
        ));
    }
}
