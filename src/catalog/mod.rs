mod errors;
mod models;
mod pagination;
mod service;

pub use errors::{CatalogError, CatalogResult};
pub use models::{normalize_types, AddBreedRequest, BreedEntry, UpdateOutcome, NO_CHANGE_MESSAGE};
pub use pagination::{BreedPage, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use service::CatalogService;
