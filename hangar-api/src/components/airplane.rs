//! Airplane component implementation.

use async_trait::async_trait;
use hangar_core::{Airplane, AirplaneMake, HangarResult, Record};
use hangar_storage::CachedAdapter;

use crate::catalog::Catalog;
use crate::component::{resolve_ref, CatalogEntity};

#[async_trait]
impl CatalogEntity for Airplane {
    const COLLECTION: &'static str = "airplane";

    fn adapter(catalog: &Catalog) -> &CachedAdapter<Self> {
        &catalog.airplanes
    }

    async fn resolve_references(&mut self, catalog: &Catalog) -> HangarResult<()> {
        self.make_details =
            resolve_ref::<AirplaneMake>(catalog, Self::ENTITY_NAME, "make", &self.make).await?;
        Ok(())
    }

    /// Fill a missing `make` with the first make whose code appears in the
    /// lower-cased airplane name ("Boeing 747-400" -> "boeing").
    async fn prepare_import(catalog: &Catalog, records: Vec<Self>) -> HangarResult<Vec<Self>> {
        let makes = catalog.airplane_makes.list().await?;
        Ok(records
            .into_iter()
            .map(|mut airplane| {
                if airplane.make.is_empty() {
                    airplane.make = infer_make(&airplane.name, &makes).unwrap_or_default();
                }
                airplane
            })
            .collect())
    }
}

fn infer_make(name: &str, makes: &[AirplaneMake]) -> Option<String> {
    let name = name.to_lowercase();
    makes
        .iter()
        .find(|make| !make.code.is_empty() && name.contains(&make.code.to_lowercase()))
        .map(|make| make.code.clone())
}
