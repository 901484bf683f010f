//! Model component implementation.
//!
//! A single model read also loads the names of every attached picture from
//! the association rows. Listing skips that per-model query.
//!
//! Deleting a model removes its association rows first, then the canonical
//! row, then any picture blob nothing references any more.

use async_trait::async_trait;
use hangar_core::{Airline, Airplane, HangarResult, Model, ModelMake, Record};
use hangar_storage::CachedAdapter;

use crate::catalog::Catalog;
use crate::component::{resolve_ref, CatalogEntity};

#[async_trait]
impl CatalogEntity for Model {
    const COLLECTION: &'static str = "model";

    fn adapter(catalog: &Catalog) -> &CachedAdapter<Self> {
        &catalog.models
    }

    async fn resolve_references(&mut self, catalog: &Catalog) -> HangarResult<()> {
        self.model_make_details =
            resolve_ref::<ModelMake>(catalog, Self::ENTITY_NAME, "modelMake", &self.model_make)
                .await?;
        self.airline_details =
            resolve_ref::<Airline>(catalog, Self::ENTITY_NAME, "airline", &self.airline).await?;
        self.airplane_details =
            resolve_ref::<Airplane>(catalog, Self::ENTITY_NAME, "airplane", &self.airplane)
                .await?;
        Ok(())
    }

    async fn get_by_code(catalog: &Catalog, code: &str) -> HangarResult<Option<Self>> {
        let Some(mut model) = catalog.models.get(code).await? else {
            return Ok(None);
        };
        model.resolve_references(catalog).await?;
        model.picture_list = catalog.models.sort_key_list(code).await?;
        Ok(Some(model))
    }

    async fn delete(catalog: &Catalog, code: &str) -> HangarResult<()> {
        let pictures = catalog.models.sort_key_list(code).await?;
        for picture in &pictures {
            catalog.models.delete_association(code, picture).await?;
        }
        catalog.models.delete_by_code(code).await?;

        let mut orphaned = Vec::new();
        for picture in pictures {
            if catalog.models.list_associations(&picture).await?.is_empty() {
                orphaned.push(picture);
            }
        }
        if !orphaned.is_empty() {
            catalog.pictures().delete_objects(&orphaned).await?;
        }

        tracing::info!(
            collection = Self::COLLECTION,
            code,
            blobs_deleted = orphaned.len(),
            "Model deleted with its picture links"
        );
        Ok(())
    }
}
