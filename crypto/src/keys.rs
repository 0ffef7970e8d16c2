//! Ed25519 identity keys.

use ed25519_dalek::SigningKey;
use reissue_types::{KeyPair, PrivateKey, PublicKey};

/// Derive a node or notary key pair from a 32-byte seed.
///
/// The same seed always yields the same identity, which is what lets a
/// node config pin its key with a hex seed.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_identity() {
        let a = keypair_from_seed(&[42u8; 32]);
        let b = keypair_from_seed(&[42u8; 32]);
        assert_eq!(a.public, b.public);
        assert_eq!(a.private.0, b.private.0);
    }

    #[test]
    fn distinct_seeds_distinct_identities() {
        assert_ne!(
            keypair_from_seed(&[1u8; 32]).public,
            keypair_from_seed(&[2u8; 32]).public
        );
    }

    #[test]
    fn public_key_is_not_the_seed() {
        let kp = keypair_from_seed(&[7u8; 32]);
        assert_ne!(kp.public.0, [7u8; 32]);
    }
}
