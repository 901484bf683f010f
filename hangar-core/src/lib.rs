//! Hangar Core - records, tags and errors for the model-airplane catalogue.
//!
//! Everything here is storage-agnostic. `hangar-storage` persists anything
//! implementing [`Record`], and `hangar-api` exposes the entities over HTTP.

pub mod entities;
pub mod error;
pub mod record;

pub use entities::{
    Airline, Airplane, AirplaneMake, Country, Model, ModelMake, ModelScale, IATA_PREFIX,
    ICAO_PREFIX, MODEL_CODE_SEPARATOR,
};
pub use error::{
    ConfigError, HangarError, HangarResult, ObjectStoreError, StorageError, ValidationError,
};
pub use record::{project_tags, Record, SearchEntry, TagEntry, TagSet};
