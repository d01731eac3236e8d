// Persistence: key-value backends, JSON persistence adapter, document store.

pub mod documents;
pub mod kv;
pub mod persistence;
pub mod seed;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("document not found: {0}")]
    NotFound(String),
}
