//! Hangar Storage - cache-backed adapters over a key-value store.
//!
//! The backing store and object store are traits so the API layer can run
//! against the in-memory implementations here or a real service.

pub mod adapter;
pub mod backend;
pub mod memory;
pub mod object_store;
pub mod search;

pub use adapter::{AdapterBuilder, BatchFailure, BatchReport, CachedAdapter, TableShape, TagProjector};
pub use backend::{string_attr, BackingStore, KeyCondition, KeyMap, Row};
pub use memory::{InMemoryBackingStore, IndexSchema, TableSchema};
pub use object_store::{InMemoryObjectStore, ObjectStore};
pub use search::{SearchBucket, SearchIndex};
