use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Reissuance(#[from] reissue_flows::ReissuanceError),

    #[error("store error: {0}")]
    Store(#[from] reissue_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("a node named {0} is already on this network")]
    DuplicateNode(String),
}
