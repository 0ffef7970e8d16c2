//! Content-addressed attachment storage trait.

use crate::StoreError;
use reissue_types::AttachmentId;

/// Trait for the attachment blob store.
pub trait AttachmentStore: Send + Sync {
    /// Store a blob under its Blake2b-256 digest and return that id.
    /// Importing the same blob twice returns the same id.
    fn import(&self, blob: &[u8]) -> Result<AttachmentId, StoreError>;

    /// Retrieve a blob by id.
    fn open(&self, id: &AttachmentId) -> Result<Vec<u8>, StoreError>;

    /// Check if a blob exists.
    fn has(&self, id: &AttachmentId) -> Result<bool, StoreError>;
}
