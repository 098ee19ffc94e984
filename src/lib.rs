//! Breed Catalog Server Library
//!
//! Exposes the store, service and HTTP layers for the binary and for tests.

pub mod breed_store;
pub mod catalog;
pub mod config;
pub mod seed;
pub mod server;
pub mod sqlite_persistence;

pub use breed_store::{BreedStore, InMemoryBreedStore, SqliteBreedStore};
pub use catalog::CatalogService;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
