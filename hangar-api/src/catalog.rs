//! The catalogue: one cache-backed adapter per entity table.
//!
//! A [`Catalog`] is built once at startup and shared through [`AppState`].
//! It owns the search index and the picture object store so every adapter
//! and service talks to the same instances.
//!
//! [`AppState`]: crate::state::AppState

use std::sync::Arc;

use hangar_core::{
    Airline, Airplane, AirplaneMake, Country, HangarResult, Model, ModelMake, Record,
};
use hangar_storage::{
    AdapterBuilder, BackingStore, CachedAdapter, InMemoryBackingStore, InMemoryObjectStore,
    ObjectStore, SearchIndex, TableSchema,
};

use crate::config::CatalogConfig;

/// Partition key attribute of every catalogue table.
pub const PRIMARY_KEY: &str = "code";
/// Sort attribute of the model table.
pub const PICTURE_SORT_KEY: &str = "picture";

pub struct Catalog {
    config: CatalogConfig,
    search: Arc<SearchIndex>,
    pictures: Arc<dyn ObjectStore>,
    pub airlines: CachedAdapter<Airline>,
    pub airplanes: CachedAdapter<Airplane>,
    pub airplane_makes: CachedAdapter<AirplaneMake>,
    pub model_makes: CachedAdapter<ModelMake>,
    pub countries: CachedAdapter<Country>,
    pub models: CachedAdapter<Model>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.config)
            .field("bucket", &self.pictures.bucket())
            .field("search_entries", &self.search.len())
            .finish()
    }
}

impl Catalog {
    /// Configure every adapter against `store`. With caching enabled each
    /// adapter performs its initial full load here, so a store failure
    /// aborts startup.
    pub async fn open(
        config: CatalogConfig,
        store: Arc<dyn BackingStore>,
        pictures: Arc<dyn ObjectStore>,
    ) -> HangarResult<Self> {
        config.validate()?;
        let search = Arc::new(SearchIndex::new());

        let countries = Self::reference_adapter::<Country>(&config, &store, &search).await?;
        let model_makes = Self::reference_adapter::<ModelMake>(&config, &store, &search).await?;
        let airplane_makes =
            Self::reference_adapter::<AirplaneMake>(&config, &store, &search).await?;
        let airplanes = Self::reference_adapter::<Airplane>(&config, &store, &search).await?;
        let airlines = Self::reference_adapter::<Airline>(&config, &store, &search).await?;

        let models = AdapterBuilder::<Model>::new(
            config.table_name(Model::ENTITY_NAME),
            PRIMARY_KEY,
        )
        .sort_key(PICTURE_SORT_KEY)
        .secondary_index(config.picture_index.clone())
        .keep_cache(config.keep_cache)
        .configure(store.clone(), search.clone())
        .await?;

        tracing::info!(
            keep_cache = config.keep_cache,
            bucket = pictures.bucket(),
            search_entries = search.len(),
            "Catalog opened"
        );

        Ok(Self {
            config,
            search,
            pictures,
            airlines,
            airplanes,
            airplane_makes,
            model_makes,
            countries,
            models,
        })
    }

    /// Catalogue over in-memory stores with every table created.
    pub async fn in_memory(config: CatalogConfig) -> HangarResult<Self> {
        let store = InMemoryBackingStore::with_tables(Self::table_schemas(&config))?;
        let pictures = InMemoryObjectStore::new(config.picture_bucket.clone());
        Self::open(config, Arc::new(store), Arc::new(pictures)).await
    }

    /// Table layout expected by [`Catalog::open`].
    pub fn table_schemas(config: &CatalogConfig) -> Vec<TableSchema> {
        let plain = [
            Airline::ENTITY_NAME,
            Airplane::ENTITY_NAME,
            AirplaneMake::ENTITY_NAME,
            ModelMake::ENTITY_NAME,
            Country::ENTITY_NAME,
        ];
        let mut schemas: Vec<TableSchema> = plain
            .iter()
            .map(|entity| TableSchema::new(config.table_name(entity), PRIMARY_KEY))
            .collect();
        schemas.push(
            TableSchema::new(config.table_name(Model::ENTITY_NAME), PRIMARY_KEY)
                .with_sort_key(PICTURE_SORT_KEY)
                .with_index(config.picture_index.clone(), PICTURE_SORT_KEY),
        );
        schemas
    }

    async fn reference_adapter<R: Record>(
        config: &CatalogConfig,
        store: &Arc<dyn BackingStore>,
        search: &Arc<SearchIndex>,
    ) -> HangarResult<CachedAdapter<R>> {
        AdapterBuilder::<R>::new(config.table_name(R::ENTITY_NAME), PRIMARY_KEY)
            .keep_cache(config.keep_cache)
            .record_tags()
            .configure(store.clone(), search.clone())
            .await
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn search(&self) -> &SearchIndex {
        &self.search
    }

    pub fn pictures(&self) -> &dyn ObjectStore {
        self.pictures.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_catalog_opens_empty() -> HangarResult<()> {
        let catalog = Catalog::in_memory(CatalogConfig::default()).await?;
        assert!(catalog.countries.list().await?.is_empty());
        assert!(catalog.search().is_empty());
        assert_eq!(catalog.pictures().bucket(), "hangar-pics");
        assert_eq!(catalog.models.shape().sort_key.as_deref(), Some(PICTURE_SORT_KEY));
        Ok(())
    }

    #[test]
    fn test_table_schemas_use_prefix() {
        let config = CatalogConfig {
            table_prefix: "test_".to_string(),
            ..CatalogConfig::default()
        };
        let names: Vec<_> = Catalog::table_schemas(&config)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names.len(), 6);
        assert!(names.iter().all(|n| n.starts_with("test_")));
        assert!(names.contains(&"test_model".to_string()));
    }
}
