//! Shared constants for end-to-end tests
//!
//! When the seeded fixture changes, update only this file.

// ============================================================================
// Seeded breeds
// ============================================================================

pub const LABRADOR: &str = "Labrador";
pub const LABRADOR_TYPES: [&str; 3] = ["Yellow", "Black", "Chocolate"];

pub const GERMAN_SHEPHERD: &str = "GermanShepherd";
pub const GERMAN_SHEPHERD_TYPES: [&str; 1] = ["Sable"];

/// Number of breeds in the seeded fixture.
pub const SEEDED_BREEDS_COUNT: usize = 2;

/// A breed that is never part of the fixture.
pub const MISSING_BREED: &str = "Husky";

// ============================================================================
// Routing
// ============================================================================

pub const BREEDS_BASE_PATH: &str = "/dogs";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
