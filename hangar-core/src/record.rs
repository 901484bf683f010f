//! Record contract shared by every catalogue entity.
//!
//! A record knows its primary code, an optional sort value, how to strip its
//! resolved references before persistence, and how to project itself into
//! search tags. Storage adapters and the search index are written purely
//! against this trait.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ============================================================================
// RECORD TRAIT
// ============================================================================

/// A persistable catalogue record.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection / table identifier.
    const ENTITY_NAME: &'static str;

    /// Stable unique primary key. Empty means "not yet derived".
    fn code(&self) -> &str;

    /// Sort key value. Empty means the record has no sort axis.
    fn sort_value(&self) -> &str {
        ""
    }

    /// Copy with every resolved reference cleared.
    fn detached(&self) -> Self {
        self.clone()
    }

    /// Side-effect-free diagnostic rendering.
    fn describe(&self) -> String {
        format!("{}[{}]", Self::ENTITY_NAME, self.code())
    }

    /// Derive the code and normalize fields ahead of a write.
    fn prepare_for_write(&mut self) -> Result<(), ValidationError> {
        if self.code().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "code".to_string(),
            });
        }
        Ok(())
    }

    /// Tag projection used to feed the search index.
    fn tags(&self) -> Vec<TagEntry> {
        Vec::new()
    }

    /// Sort value actually written to the store: the code when unset.
    fn effective_sort_value(&self) -> &str {
        match self.sort_value() {
            "" => self.code(),
            sort => sort,
        }
    }

    /// Canonical rows carry `sort == code`; everything else is an association.
    fn is_canonical(&self) -> bool {
        self.effective_sort_value() == self.code()
    }

    fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

// ============================================================================
// TAGS
// ============================================================================

/// One search tag produced by a record, before it is stamped with a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub tag: String,
    pub code: String,
    pub name: String,
}

/// A tag as stored in the search index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchEntry {
    pub code: String,
    pub tag: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
}

impl SearchEntry {
    pub fn stamped(entity_type: &str, entry: TagEntry) -> Self {
        Self {
            code: entry.code,
            tag: entry.tag,
            entity_type: entity_type.to_string(),
            name: entry.name,
        }
    }
}

/// Builder collecting the tags of one or more records.
///
/// Empty tags are skipped and every tag is lower-cased on the way in.
#[derive(Debug, Default)]
pub struct TagSet {
    entries: Vec<TagEntry>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: &str, code: &str, name: &str) -> &mut Self {
        if !tag.is_empty() {
            self.entries.push(TagEntry {
                tag: tag.to_lowercase(),
                code: code.to_string(),
                name: name.to_string(),
            });
        }
        self
    }

    pub fn into_entries(self) -> Vec<TagEntry> {
        self.entries
    }
}

/// Flatten the tags of every record, in record order.
pub fn project_tags<R: Record>(records: &[R]) -> Vec<TagEntry> {
    records.iter().flat_map(Record::tags).collect()
}
