//! Canonical bincode encoding for transactions and attachments.
//!
//! Fixed-width integers and strict decoding: trailing bytes after a value are
//! an error, so a blob decodes to exactly one value or fails.

use crate::error::TransactionError;
use crate::transaction::SignedTransaction;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode any value with the canonical options.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, TransactionError> {
    options()
        .serialize(value)
        .map_err(|e| TransactionError::Codec(e.to_string()))
}

/// Decode a value, rejecting trailing bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, TransactionError> {
    options()
        .deserialize(bytes)
        .map_err(|e| TransactionError::Codec(e.to_string()))
}

/// Serialize a signed transaction into an attachment blob.
pub fn encode_signed(stx: &SignedTransaction) -> Result<Vec<u8>, TransactionError> {
    encode(stx)
}

/// Deserialize an attachment blob into a signed transaction.
pub fn decode_signed(bytes: &[u8]) -> Result<SignedTransaction, TransactionError> {
    decode(bytes)
}
