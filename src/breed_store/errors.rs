use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("catalog record does not exist")]
    RecordNotFound,

    #[error("breed '{0}' does not exist")]
    FieldNotFound(String),

    #[error("catalog record already exists")]
    AlreadyExists,

    #[error("breed name must not be empty")]
    InvalidFieldName,

    #[error("stored types for breed '{name}' are unreadable: {source}")]
    CorruptedField {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog record {column} is unreadable: {source}")]
    CorruptedMetadata {
        column: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),
}

impl StoreError {
    pub fn unavailable<M: std::fmt::Display>(message: M) -> Self {
        StoreError::StorageUnavailable(anyhow::anyhow!("{}", message))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::StorageUnavailable(err.into())
    }
}
