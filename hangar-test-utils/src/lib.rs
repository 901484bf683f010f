//! Hangar Test Utilities
//!
//! Shared test infrastructure for the Hangar workspace:
//! - Fixtures for the catalogue entities used across scenarios
//! - Proptest generators for entity records and search queries
//! - A fault-injecting backing store wrapper

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hangar_storage::{BackingStore, KeyCondition, KeyMap, Row};

// Re-export core types for convenience
pub use hangar_core::{
    Airline, Airplane, AirplaneMake, Country, HangarError, HangarResult, Model, ModelMake,
    ModelScale, Record, StorageError,
};
pub use hangar_storage::{InMemoryBackingStore, InMemoryObjectStore, SearchIndex, TableSchema};

// ============================================================================
// FAULT INJECTION
// ============================================================================

/// Backing store wrapper that fails reads or writes on demand.
///
/// Every call is forwarded to the inner store unless the matching switch
/// is on, in which case a [`StorageError::Backend`] is returned.
#[derive(Debug)]
pub struct FlakyBackingStore<S> {
    inner: S,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl<S: BackingStore> FlakyBackingStore<S> {
    pub fn new(inner: S) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        })
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, switch: &AtomicBool, table: &str, operation: &str) -> HangarResult<()> {
        if switch.load(Ordering::SeqCst) {
            return Err(StorageError::Backend {
                table: table.to_string(),
                operation: operation.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl<S: BackingStore> BackingStore for FlakyBackingStore<S> {
    async fn scan(&self, table: &str) -> HangarResult<Vec<Row>> {
        self.check(&self.fail_reads, table, "scan")?;
        self.inner.scan(table).await
    }

    async fn get_item(&self, table: &str, key: &KeyMap) -> HangarResult<Option<Row>> {
        self.check(&self.fail_reads, table, "get_item")?;
        self.inner.get_item(table, key).await
    }

    async fn put_item(&self, table: &str, row: Row) -> HangarResult<()> {
        self.check(&self.fail_writes, table, "put_item")?;
        self.inner.put_item(table, row).await
    }

    async fn delete_item(&self, table: &str, key: &KeyMap) -> HangarResult<()> {
        self.check(&self.fail_writes, table, "delete_item")?;
        self.inner.delete_item(table, key).await
    }

    async fn query(
        &self,
        table: &str,
        index: Option<&str>,
        condition: &KeyCondition,
    ) -> HangarResult<Vec<Row>> {
        self.check(&self.fail_reads, table, "query")?;
        self.inner.query(table, index, condition).await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// Short lower-case code.
    pub fn arb_code() -> impl Strategy<Value = String> {
        "[a-z]{2,6}"
    }

    /// Two-letter country code.
    pub fn arb_country_code() -> impl Strategy<Value = String> {
        "[a-z]{2}"
    }

    pub fn arb_country() -> impl Strategy<Value = Country> {
        (
            arb_country_code(),
            prop::sample::select(vec!["Europe", "Asia", "Africa", "North America"]),
            "[A-Z][a-z]{3,10}",
        )
            .prop_map(|(code, continent, name)| Country {
                code,
                continent: continent.to_string(),
                name,
            })
    }

    pub fn arb_model_make() -> impl Strategy<Value = ModelMake> {
        (arb_code(), "[A-Z][a-z]{3,10}").prop_map(|(code, name)| ModelMake { code, name })
    }

    pub fn arb_model_scale() -> impl Strategy<Value = ModelScale> {
        prop_oneof![Just(ModelScale::OneTo200), Just(ModelScale::OneTo400)]
    }

    /// Airline without a code, to be derived from its designators.
    pub fn arb_airline_designators() -> impl Strategy<Value = Airline> {
        (
            "[A-Z]{2}",
            "[A-Z]{3}",
            any::<bool>(),
            "[A-Z][a-z]{3,8} Air",
        )
            .prop_map(|(iata, icao, has_iata, name)| Airline {
                iata: if has_iata { iata } else { String::new() },
                icao,
                name,
                ..Airline::default()
            })
    }

    /// Canonical model with unset code.
    pub fn arb_model() -> impl Strategy<Value = Model> {
        (arb_code(), arb_model_scale(), "[A-Z]-[A-Z]{4}", any::<bool>()).prop_map(
            |(model_make, scale, reg, is_cargo)| Model {
                model_make,
                scale: Some(scale),
                reg,
                is_cargo,
                ..Model::default()
            },
        )
    }

    /// Search query, possibly mixed case.
    pub fn arb_query() -> impl Strategy<Value = String> {
        "[a-zA-Z]{1,4}"
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;

    pub fn country(code: &str, name: &str) -> Country {
        Country {
            code: code.to_string(),
            continent: "Europe".to_string(),
            name: name.to_string(),
        }
    }

    pub fn united_kingdom() -> Country {
        country("gb", "United Kingdom")
    }

    pub fn model_make(code: &str, name: &str) -> ModelMake {
        ModelMake {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    pub fn airplane_make(code: &str, name: &str, country: &str) -> AirplaneMake {
        AirplaneMake {
            code: code.to_string(),
            name: name.to_string(),
            abbreviation: code.to_uppercase(),
            country: country.to_string(),
            country_details: None,
        }
    }

    pub fn airplane(code: &str, name: &str, make: &str) -> Airplane {
        Airplane {
            code: code.to_string(),
            name: name.to_string(),
            make: make.to_string(),
            ..Airplane::default()
        }
    }

    /// British Airways with no code; it derives to `iata:ba`.
    pub fn british_airways() -> Airline {
        Airline {
            name: "British Airways".to_string(),
            iata: "BA".to_string(),
            icao: "BAW".to_string(),
            callsign: "SPEEDBIRD".to_string(),
            country: "gb".to_string(),
            ..Airline::default()
        }
    }

    /// 1/400 model of `reg` by `make`, code left for derivation.
    pub fn model(make: &str, reg: &str) -> Model {
        Model {
            model_make: make.to_string(),
            scale: Some(ModelScale::OneTo400),
            reg: reg.to_string(),
            ..Model::default()
        }
    }

    /// JSON body for a record, for request builders.
    pub fn json_body<R: Record>(record: &R) -> Result<String, String> {
        serde_json::to_string(record).map_err(|e| e.to_string())
    }
}
