//! Airplane make component implementation.

use async_trait::async_trait;
use hangar_core::{AirplaneMake, Country, HangarResult, Record};
use hangar_storage::CachedAdapter;

use crate::catalog::Catalog;
use crate::component::{resolve_ref, CatalogEntity};

#[async_trait]
impl CatalogEntity for AirplaneMake {
    const COLLECTION: &'static str = "airplanemake";

    fn adapter(catalog: &Catalog) -> &CachedAdapter<Self> {
        &catalog.airplane_makes
    }

    async fn resolve_references(&mut self, catalog: &Catalog) -> HangarResult<()> {
        self.country_details =
            resolve_ref::<Country>(catalog, Self::ENTITY_NAME, "country", &self.country).await?;
        Ok(())
    }
}
