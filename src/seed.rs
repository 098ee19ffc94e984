//! Bootstrap seeding of the catalog record.

use crate::breed_store::{BreedMap, BreedStore, StoreError, StoreResult};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

const DEFAULT_BREEDS_JSON: &str = include_str!("../data/breeds.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// A new record was created holding this many breeds.
    Created(usize),
    AlreadyPresent,
}

fn parse_breeds(content: &str) -> serde_json::Result<BreedMap> {
    serde_json::from_str(content)
}

/// The dataset shipped with the binary.
pub fn default_breeds() -> Result<BreedMap> {
    parse_breeds(DEFAULT_BREEDS_JSON).context("Embedded breed dataset is not valid JSON")
}

/// Reads a seed dataset from a JSON file: an object mapping breed names to
/// arrays of types.
pub fn load_seed_file(path: &Path) -> Result<BreedMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {:?}", path))?;
    parse_breeds(&content).with_context(|| format!("Failed to parse seed file: {:?}", path))
}

/// Creates the catalog record from `breeds` unless one already exists.
pub fn seed_if_absent(store: &dyn BreedStore, breeds: &BreedMap) -> StoreResult<SeedOutcome> {
    match store.load_record() {
        Ok(record) => {
            info!("Catalog record already present with {} breeds", record.len());
            return Ok(SeedOutcome::AlreadyPresent);
        }
        Err(StoreError::RecordNotFound) => {}
        Err(err) => return Err(err),
    }

    match store.create_record(breeds) {
        Ok(()) => {
            info!("Seeded catalog record with {} breeds", breeds.len());
            Ok(SeedOutcome::Created(breeds.len()))
        }
        Err(StoreError::AlreadyExists) => {
            warn!("Catalog record was created concurrently, skipping seed");
            Ok(SeedOutcome::AlreadyPresent)
        }
        Err(err) => Err(err),
    }
}
