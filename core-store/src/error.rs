use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid trace state: {0}")]
    InvalidTraceState(String),

    #[error("Invalid sync state: {0}")]
    InvalidSyncState(String),

    #[error("Invalid tags column: {0}")]
    InvalidTags(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
