use crate::breed_store::StoreError;
use thiserror::Error;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Failures surfaced by the catalog service, one variant per response class.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    StorageUnavailable(String),
}

impl CatalogError {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Validation(_) => "validation_error",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Internal(_) => "internal_error",
            CatalogError::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    pub fn record_not_found() -> Self {
        CatalogError::NotFound("No breed catalog found".to_string())
    }

    pub fn breed_not_found(name: &str) -> Self {
        CatalogError::NotFound(format!("Breed '{}' not found", name))
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RecordNotFound => CatalogError::record_not_found(),
            StoreError::FieldNotFound(name) => CatalogError::breed_not_found(&name),
            StoreError::InvalidFieldName => CatalogError::Validation(err.to_string()),
            StoreError::AlreadyExists
            | StoreError::CorruptedField { .. }
            | StoreError::CorruptedMetadata { .. } => {
                CatalogError::Internal(err.to_string())
            }
            StoreError::StorageUnavailable(_) => CatalogError::StorageUnavailable(err.to_string()),
        }
    }
}
