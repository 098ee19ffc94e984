//! In-memory breed store.
//!
//! Same contract as the SQLite store without durability. Used by tests and
//! for throwaway `--in-memory` runs.

use super::{BreedMap, BreedStore, CatalogRecord, StoreError, StoreResult};
use chrono::Utc;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub struct InMemoryBreedStore {
    record: RwLock<Option<CatalogRecord>>,
}

impl InMemoryBreedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_breeds(breeds: BreedMap) -> Self {
        InMemoryBreedStore {
            record: RwLock::new(Some(CatalogRecord::new(breeds))),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Option<CatalogRecord>>> {
        self.record
            .read()
            .map_err(|_| StoreError::unavailable("in-memory catalog lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Option<CatalogRecord>>> {
        self.record
            .write()
            .map_err(|_| StoreError::unavailable("in-memory catalog lock poisoned"))
    }
}

impl BreedStore for InMemoryBreedStore {
    fn load_record(&self) -> StoreResult<CatalogRecord> {
        self.read()?.clone().ok_or(StoreError::RecordNotFound)
    }

    fn set_field(&self, name: &str, types: &[String]) -> StoreResult<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidFieldName);
        }
        let mut guard = self.write()?;
        let record = guard.as_mut().ok_or(StoreError::RecordNotFound)?;
        record.breeds.insert(name.to_string(), types.to_vec());
        record.updated_at = Utc::now();
        Ok(())
    }

    fn delete_field(&self, name: &str) -> StoreResult<()> {
        let mut guard = self.write()?;
        let record = guard.as_mut().ok_or(StoreError::RecordNotFound)?;
        // shift_remove keeps the remaining breeds in insertion order.
        if record.breeds.shift_remove(name).is_none() {
            return Err(StoreError::FieldNotFound(name.to_string()));
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    fn create_record(&self, initial: &BreedMap) -> StoreResult<()> {
        if initial.keys().any(|name| name.is_empty()) {
            return Err(StoreError::InvalidFieldName);
        }
        let mut guard = self.write()?;
        if guard.is_some() {
            return Err(StoreError::AlreadyExists);
        }
        *guard = Some(CatalogRecord::new(initial.clone()));
        Ok(())
    }
}
