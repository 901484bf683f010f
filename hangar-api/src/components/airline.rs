//! Airline component implementation.
//!
//! Airlines are looked up leniently: a bare designator such as `ba` also
//! matches the derived codes `iata:ba` and `icao:ba`.

use std::collections::HashMap;

use async_trait::async_trait;
use hangar_core::{Airline, Country, HangarResult, Record};
use hangar_storage::CachedAdapter;

use crate::catalog::Catalog;
use crate::component::{resolve_ref, CatalogEntity};

#[async_trait]
impl CatalogEntity for Airline {
    const COLLECTION: &'static str = "airline";

    fn adapter(catalog: &Catalog) -> &CachedAdapter<Self> {
        &catalog.airlines
    }

    async fn resolve_references(&mut self, catalog: &Catalog) -> HangarResult<()> {
        self.country_details =
            resolve_ref::<Country>(catalog, Self::ENTITY_NAME, "country", &self.country).await?;
        Ok(())
    }

    async fn get_by_code(catalog: &Catalog, code: &str) -> HangarResult<Option<Self>> {
        if code.is_empty() {
            return Ok(None);
        }
        for candidate in Airline::lookup_candidates(code) {
            if let Some(mut airline) = catalog.airlines.get(&candidate).await? {
                airline.resolve_references(catalog).await?;
                return Ok(Some(airline));
            }
        }
        Ok(None)
    }

    /// Airline dumps carry mixed-case designators and country names rather
    /// than country codes.
    async fn prepare_import(catalog: &Catalog, records: Vec<Self>) -> HangarResult<Vec<Self>> {
        let countries = CountryLookup::new(catalog.countries.list().await?);
        Ok(records
            .into_iter()
            .map(|airline| normalize_import(airline, &countries))
            .collect())
    }
}

/// Maps either a country code or a country name to the code.
struct CountryLookup {
    by_code: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

impl CountryLookup {
    fn new(countries: Vec<Country>) -> Self {
        let mut by_code = HashMap::new();
        let mut by_name = HashMap::new();
        for country in countries {
            by_name.insert(country.name.to_lowercase(), country.code.clone());
            by_code.insert(country.code.to_lowercase(), country.code);
        }
        Self { by_code, by_name }
    }

    fn resolve(&self, raw: &str) -> String {
        let key = raw.trim().to_lowercase();
        self.by_code
            .get(&key)
            .or_else(|| self.by_name.get(&key))
            .cloned()
            .unwrap_or_default()
    }
}

fn normalize_import(mut airline: Airline, countries: &CountryLookup) -> Airline {
    airline.code = airline.code.to_lowercase();
    airline.iata = airline.iata.to_lowercase();
    airline.icao = airline.icao.to_lowercase();
    airline.callsign = airline.callsign.to_lowercase();
    airline.name = airline.name.to_uppercase();
    if !airline.country.is_empty() {
        let resolved = countries.resolve(&airline.country);
        if resolved.is_empty() {
            tracing::debug!(
                airline = %airline.name,
                country = %airline.country,
                "Unknown country dropped during import"
            );
        }
        airline.country = resolved;
    }
    airline
}
