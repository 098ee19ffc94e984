//! BreedStore trait definition.

use super::{BreedMap, CatalogRecord, StoreResult};

/// Field-level persistence for the singleton catalog record.
///
/// Every write is atomic on its own: once a call returns, subsequent reads
/// observe either the whole change or none of it. There are no cross-field
/// transactions; two writers touching the same breed resolve as last write
/// wins, writers touching different breeds never clobber each other.
pub trait BreedStore: Send + Sync {
    /// Returns the current record, or `RecordNotFound` before seeding.
    fn load_record(&self) -> StoreResult<CatalogRecord>;

    /// Inserts or replaces a single breed's types.
    ///
    /// A new breed is appended after the existing ones; replacing an existing
    /// breed keeps its position. Fails with `RecordNotFound` when there is no
    /// record to write into.
    fn set_field(&self, name: &str, types: &[String]) -> StoreResult<()>;

    /// Removes a breed, failing with `FieldNotFound` if it is already gone.
    fn delete_field(&self, name: &str) -> StoreResult<()>;

    /// Creates the record with `initial` breeds, in iteration order.
    /// Fails with `AlreadyExists` if a record is present.
    fn create_record(&self, initial: &BreedMap) -> StoreResult<()>;
}
