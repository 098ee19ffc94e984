//! Test fixture creation
//!
//! Builds a temporary SQLite catalog seeded with a small, known breed set.

use super::constants::*;
use anyhow::Result;
use breed_catalog_server::breed_store::{BreedMap, SqliteBreedStore};
use breed_catalog_server::seed::{seed_if_absent, SeedOutcome};
use std::path::PathBuf;
use tempfile::TempDir;

pub fn seeded_breeds() -> BreedMap {
    let mut breeds = BreedMap::new();
    breeds.insert(
        LABRADOR.to_string(),
        LABRADOR_TYPES.iter().map(|t| t.to_string()).collect(),
    );
    breeds.insert(
        GERMAN_SHEPHERD.to_string(),
        GERMAN_SHEPHERD_TYPES.iter().map(|t| t.to_string()).collect(),
    );
    breeds
}

/// Creates a temp dir holding a seeded `breeds.db`. The `TempDir` must be
/// kept alive for as long as the database is used.
pub fn create_test_catalog() -> Result<(TempDir, PathBuf, SqliteBreedStore)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("breeds.db");
    let store = SqliteBreedStore::new(&db_path)?;

    let outcome = seed_if_absent(&store, &seeded_breeds())?;
    anyhow::ensure!(
        outcome == SeedOutcome::Created(SEEDED_BREEDS_COUNT),
        "Unexpected seed outcome: {:?}",
        outcome
    );

    Ok((temp_dir, db_path, store))
}
