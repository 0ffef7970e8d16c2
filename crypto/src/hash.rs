//! Blake2b hashing for transactions and attachments.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use reissue_types::{AttachmentId, TxId};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a serialized wire transaction to produce its `TxId`.
pub fn hash_transaction(tx_bytes: &[u8]) -> TxId {
    TxId::new(blake2b_256(tx_bytes))
}

/// Hash an attachment blob to produce its content address.
pub fn hash_attachment(blob: &[u8]) -> AttachmentId {
    AttachmentId::new(blake2b_256(blob))
}
