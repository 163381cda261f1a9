use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Store error: {0}")]
    Store(#[from] core_store::StoreError),

    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Feature encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
