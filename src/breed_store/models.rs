use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Breed name to type labels, iterated in insertion order.
pub type BreedMap = IndexMap<String, Vec<String>>;

/// The singleton catalog record.
///
/// Timestamps are kept next to the breed map rather than inside it, so a
/// breed can never collide with (or be mistaken for) record metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub breeds: BreedMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogRecord {
    pub fn new(breeds: BreedMap) -> Self {
        let now = Utc::now();
        CatalogRecord {
            breeds,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Vec<String>> {
        self.breeds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.breeds.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.breeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breeds.is_empty()
    }
}
