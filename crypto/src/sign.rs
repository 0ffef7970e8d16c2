//! Ed25519 signatures over transaction ids.
//!
//! Signers never sign transaction content directly: they sign the 32-byte
//! id, which is the Blake2b-256 content address of the encoded transaction.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use reissue_types::{PrivateKey, PublicKey, Signature};

/// Sign `message` (in practice a transaction id) with `private_key`.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Whether `signature` over `message` was made by `public_key`.
///
/// A key that is not a valid curve point verifies nothing.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_transaction;
    use crate::keys::keypair_from_seed;

    #[test]
    fn signature_over_a_tx_id_verifies() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let id = hash_transaction(b"encoded transaction");
        let sig = sign_message(id.as_bytes(), &kp.private);
        assert!(verify_signature(id.as_bytes(), &sig, &kp.public));
    }

    #[test]
    fn signature_does_not_carry_to_another_id() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let sig = sign_message(hash_transaction(b"first").as_bytes(), &kp.private);
        assert!(!verify_signature(
            hash_transaction(b"second").as_bytes(),
            &sig,
            &kp.public
        ));
    }

    #[test]
    fn another_key_does_not_verify() {
        let signer = keypair_from_seed(&[1u8; 32]);
        let other = keypair_from_seed(&[2u8; 32]);
        let sig = sign_message(b"id", &signer.private);
        assert!(!verify_signature(b"id", &sig, &other.public));
    }

    #[test]
    fn invalid_public_key_verifies_nothing() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let sig = sign_message(b"id", &kp.private);
        assert!(!verify_signature(b"id", &sig, &PublicKey([0xFF; 32])));
    }
}
