use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub const NO_CHANGE_MESSAGE: &str = "No change detected";

/// A single breed materialized from the catalog record.
///
/// Serializes as a one-entry object, `{ "<name>": [types...] }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedEntry {
    pub name: String,
    pub types: Vec<String>,
}

impl BreedEntry {
    pub fn new<S: Into<String>>(name: S, types: Vec<String>) -> Self {
        BreedEntry {
            name: name.into(),
            types,
        }
    }
}

impl Serialize for BreedEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.types)?;
        map.end()
    }
}

/// Result of an update. `changed == false` means the stored types already
/// matched and nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub entry: BreedEntry,
    pub changed: bool,
}

impl Serialize for UpdateOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.changed { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(&self.entry.name, &self.entry.types)?;
        if !self.changed {
            map.serialize_entry("message", NO_CHANGE_MESSAGE)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddBreedRequest {
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

/// Trims every label and drops the ones left empty. Order and duplicates are kept.
pub fn normalize_types(types: Vec<String>) -> Vec<String> {
    types
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
