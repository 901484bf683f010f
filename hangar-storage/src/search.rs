//! Process-wide fuzzy search index.
//!
//! Maps a lower-cased tag to every entry carrying it. Entity adapters feed it
//! from their tag projections during a full cache reload; lookups return
//! exact tag matches first, then entries whose tag contains the query.

use std::collections::HashSet;

use dashmap::DashMap;
use hangar_core::{SearchEntry, TagEntry};
use serde::{Deserialize, Serialize};

/// One bucket of the index, as exposed by the diagnostic dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBucket {
    pub key: String,
    pub elements: Vec<SearchEntry>,
}

/// Tag index shared by every adapter.
#[derive(Debug, Default)]
pub struct SearchIndex {
    buckets: DashMap<String, Vec<SearchEntry>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one tag for `entity_type`. Empty tags are ignored.
    pub fn add_entry(&self, entity_type: &str, entry: TagEntry) {
        if entry.tag.is_empty() {
            return;
        }
        let key = entry.tag.to_lowercase();
        let mut stamped = SearchEntry::stamped(entity_type, entry);
        stamped.tag = key.clone();
        self.buckets.entry(key).or_default().push(stamped);
    }

    pub fn add_entries(&self, entity_type: &str, entries: impl IntoIterator<Item = TagEntry>) {
        for entry in entries {
            self.add_entry(entity_type, entry);
        }
    }

    /// Drop every entry stamped with `entity_type`, then add `entries`.
    ///
    /// Searches running concurrently may observe the type briefly missing.
    pub fn replace_entity_type(
        &self,
        entity_type: &str,
        entries: impl IntoIterator<Item = TagEntry>,
    ) {
        self.buckets.retain(|_, elements| {
            elements.retain(|e| e.entity_type != entity_type);
            !elements.is_empty()
        });
        self.add_entries(entity_type, entries);
    }

    /// Drop the entries of one record.
    pub fn remove_code(&self, entity_type: &str, code: &str) {
        self.buckets.retain(|_, elements| {
            elements.retain(|e| !(e.entity_type == entity_type && e.code == code));
            !elements.is_empty()
        });
    }

    /// Exact matches first, then containment matches, deduplicated by
    /// `(code, type)` keeping the first occurrence.
    pub fn search(&self, query: &str) -> Vec<SearchEntry> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        // Clone out of the shard guard before iterating the map.
        let exact = self
            .buckets
            .get(&query)
            .map(|bucket| bucket.value().clone())
            .unwrap_or_default();

        let mut approx: Vec<(String, Vec<SearchEntry>)> = self
            .buckets
            .iter()
            .filter(|bucket| bucket.key() != &query && bucket.key().contains(&query))
            .map(|bucket| (bucket.key().clone(), bucket.value().clone()))
            .collect();
        approx.sort_by(|a, b| a.0.cmp(&b.0));

        let mut seen = HashSet::new();
        exact
            .into_iter()
            .chain(approx.into_iter().flat_map(|(_, elements)| elements))
            .filter(|entry| seen.insert((entry.code.clone(), entry.entity_type.clone())))
            .collect()
    }

    /// Full dump, ordered by tag.
    pub fn buckets(&self) -> Vec<SearchBucket> {
        let mut dump: Vec<SearchBucket> = self
            .buckets
            .iter()
            .map(|bucket| SearchBucket {
                key: bucket.key().clone(),
                elements: bucket.value().clone(),
            })
            .collect();
        dump.sort_by(|a, b| a.key.cmp(&b.key));
        dump
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
