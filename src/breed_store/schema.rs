//! SQLite schema for the breed catalog database.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema};

// =============================================================================
// Version 1
// =============================================================================

/// Holds at most one row (id = 1); its presence is what "the record exists" means.
const CATALOG_RECORD_TABLE_V1: Table = Table {
    name: "catalog_record",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Text, non_null = true),
    ],
    indices: &[],
};

/// One row per breed. `types` is a JSON array, `position` fixes iteration order.
const BREEDS_TABLE_V1: Table = Table {
    name: "breeds",
    columns: &[
        sqlite_column!("name", &SqlType::Text, is_primary_key = true),
        sqlite_column!("types", &SqlType::Text, non_null = true),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_breeds_position", "position")],
};

pub const CATALOG_RECORD_ID: i64 = 1;

pub const BREED_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[CATALOG_RECORD_TABLE_V1, BREEDS_TABLE_V1],
    migration: None,
}];
