use super::{
    normalize_types, AddBreedRequest, BreedEntry, BreedPage, CatalogError, CatalogResult,
    PageRequest, UpdateOutcome,
};
use crate::breed_store::{BreedStore, CatalogRecord, StoreError};
use crate::server::metrics;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Request-shaped operations over a [`BreedStore`].
///
/// Holds no state besides the store handle: every call re-reads the record,
/// checks presence before mutating, and only then writes.
pub struct CatalogService {
    store: Arc<dyn BreedStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BreedStore>) -> Self {
        CatalogService { store }
    }

    fn observe<T, F>(&self, operation: &'static str, op: F) -> CatalogResult<T>
    where
        F: FnOnce() -> CatalogResult<T>,
    {
        let result = op();
        match &result {
            Ok(_) => metrics::record_catalog_operation(operation, "ok"),
            Err(err) => {
                metrics::record_catalog_operation(operation, err.kind());
                match err {
                    CatalogError::Internal(_) | CatalogError::StorageUnavailable(_) => {
                        error!("Catalog {} failed: {}", operation, err)
                    }
                    CatalogError::Validation(_) | CatalogError::NotFound(_) => {
                        debug!("Catalog {} rejected: {}", operation, err)
                    }
                }
            }
        }
        result
    }

    fn load_record(&self) -> CatalogResult<CatalogRecord> {
        Ok(self.store.load_record()?)
    }

    /// Re-reads the record so the breeds gauge tracks what is stored, not a
    /// count taken before the write.
    fn refresh_breeds_gauge(&self) {
        match self.store.load_record() {
            Ok(record) => metrics::set_breeds_count(record.len()),
            Err(err) => warn!("Could not refresh breeds gauge: {}", err),
        }
    }

    pub fn list(&self, request: PageRequest) -> CatalogResult<BreedPage> {
        self.observe("list", || {
            let record = self.load_record()?;
            let page = BreedPage::paginate(record.breeds, request);
            debug!(
                "Listed page {} (limit {}): {} of {} breeds",
                page.page,
                request.limit,
                page.data.len(),
                page.total
            );
            Ok(page)
        })
    }

    pub fn get_one(&self, name: &str) -> CatalogResult<BreedEntry> {
        self.observe("get_one", || {
            let mut record = self.load_record()?;
            record
                .breeds
                .swap_remove(name)
                .map(|types| BreedEntry::new(name, types))
                .ok_or_else(|| CatalogError::breed_not_found(name))
        })
    }

    /// Upserts a breed: adding a name that already exists replaces its types.
    pub fn add(&self, request: AddBreedRequest) -> CatalogResult<BreedEntry> {
        self.observe("add", || {
            let name = request
                .breed
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| CatalogError::Validation("Breed name is required".to_string()))?
                .to_string();
            let types = normalize_types(request.types.unwrap_or_default());

            // The record is only ever created by the bootstrap seeder.
            self.load_record()?;
            self.store.set_field(&name, &types)?;

            let stored = match self.store.load_record() {
                Ok(record) => record,
                Err(StoreError::RecordNotFound) => {
                    return Err(CatalogError::Internal(
                        "Catalog record disappeared after saving breed".to_string(),
                    ))
                }
                Err(err) => return Err(err.into()),
            };
            metrics::set_breeds_count(stored.len());

            let stored_types = stored.get(&name).cloned().ok_or_else(|| {
                CatalogError::Internal("Failed to retrieve added breed after save".to_string())
            })?;
            info!("Added breed '{}' with {} types", name, stored_types.len());
            Ok(BreedEntry::new(name, stored_types))
        })
    }

    /// Replaces the types of an existing breed. Never creates a breed.
    ///
    /// Types are compared and stored exactly as sent. Identical types (same
    /// labels, same order) short-circuit into an unchanged outcome without
    /// writing.
    pub fn update(&self, name: &str, types: Option<Vec<String>>) -> CatalogResult<UpdateOutcome> {
        self.observe("update", || {
            let types = types
                .ok_or_else(|| CatalogError::Validation("Breed types are required".to_string()))?;

            let record = self.load_record()?;
            let current = record
                .get(name)
                .ok_or_else(|| CatalogError::breed_not_found(name))?;

            if *current == types {
                debug!("Update of breed '{}' is a no-op", name);
                return Ok(UpdateOutcome {
                    entry: BreedEntry::new(name, types),
                    changed: false,
                });
            }

            self.store.set_field(name, &types)?;
            info!("Updated breed '{}' to {} types", name, types.len());
            Ok(UpdateOutcome {
                entry: BreedEntry::new(name, types),
                changed: true,
            })
        })
    }

    /// Removes a breed and returns a confirmation message.
    pub fn delete(&self, name: &str) -> CatalogResult<String> {
        self.observe("delete", || {
            let record = self.load_record()?;
            if !record.contains(name) {
                return Err(CatalogError::breed_not_found(name));
            }

            self.store.delete_field(name)?;
            self.refresh_breeds_gauge();
            info!("Deleted breed '{}'", name);
            Ok(format!("Breed '{}' deleted", name))
        })
    }
}
