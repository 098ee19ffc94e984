mod errors;
mod memory_store;
mod models;
mod schema;
mod sqlite_store;
mod trait_def;

pub use errors::{StoreError, StoreResult};
pub use memory_store::InMemoryBreedStore;
pub use models::{BreedMap, CatalogRecord};
pub use schema::BREED_VERSIONED_SCHEMAS;
pub use sqlite_store::SqliteBreedStore;
pub use trait_def::BreedStore;
