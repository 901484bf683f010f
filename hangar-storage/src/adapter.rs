//! Cache-backed storage adapter.
//!
//! One [`CachedAdapter`] fronts one table. When caching is enabled it keeps
//! an in-process mirror of every canonical row, refreshed by a full scan and
//! updated write-through after each successful store write. Association rows
//! (sort value different from the code) are never mirrored.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use hangar_core::{
    project_tags, ConfigError, HangarError, HangarResult, Record, StorageError, TagEntry,
    ValidationError,
};
use serde::Serialize;
use serde_json::Value;

use crate::backend::{string_attr, BackingStore, KeyCondition, KeyMap, Row};
use crate::search::SearchIndex;

/// Projection of a whole table into search tags, run on every full reload.
pub type TagProjector<R> = fn(&[R]) -> Vec<TagEntry>;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Physical layout of the table an adapter works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableShape {
    pub table_name: String,
    pub primary_key: String,
    pub sort_key: Option<String>,
    pub secondary_index: Option<String>,
}

/// Builder for [`CachedAdapter`].
///
/// Shape options are only available here; once configured an adapter's
/// key layout and caching mode are fixed.
pub struct AdapterBuilder<R: Record> {
    shape: TableShape,
    keep_cache: bool,
    projector: Option<TagProjector<R>>,
}

impl<R: Record> AdapterBuilder<R> {
    pub fn new(table_name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            shape: TableShape {
                table_name: table_name.into(),
                primary_key: primary_key.into(),
                sort_key: None,
                secondary_index: None,
            },
            keep_cache: false,
            projector: None,
        }
    }

    pub fn sort_key(mut self, name: impl Into<String>) -> Self {
        self.shape.sort_key = Some(name.into());
        self
    }

    /// Secondary index keyed by the sort attribute. Requires a sort key.
    pub fn secondary_index(mut self, name: impl Into<String>) -> Self {
        self.shape.secondary_index = Some(name.into());
        self
    }

    pub fn keep_cache(mut self, keep_cache: bool) -> Self {
        self.keep_cache = keep_cache;
        self
    }

    pub fn tag_projector(mut self, projector: TagProjector<R>) -> Self {
        self.projector = Some(projector);
        self
    }

    /// Use the record's own [`Record::tags`] as projector.
    pub fn record_tags(self) -> Self {
        self.tag_projector(project_tags::<R>)
    }

    /// Validate the shape and build the adapter. When caching, the mirror
    /// is loaded before this returns.
    pub async fn configure(
        self,
        store: Arc<dyn BackingStore>,
        search: Arc<SearchIndex>,
    ) -> HangarResult<CachedAdapter<R>> {
        if self.shape.secondary_index.is_some() && self.shape.sort_key.is_none() {
            return Err(ConfigError::IncompatibleOptions {
                option_a: "secondary_index".to_string(),
                option_b: "missing sort_key".to_string(),
            }
            .into());
        }

        let adapter = CachedAdapter {
            shape: self.shape,
            store,
            search,
            mirror: self.keep_cache.then(|| RwLock::new(HashMap::new())),
            projector: self.projector,
        };

        if adapter.keeps_cache() {
            adapter.reload_cache().await?;
        }

        tracing::debug!(
            table = %adapter.shape.table_name,
            entity = R::ENTITY_NAME,
            keep_cache = adapter.keeps_cache(),
            "Adapter configured"
        );
        Ok(adapter)
    }
}

// ============================================================================
// BATCH REPORT
// ============================================================================

/// Outcome of [`CachedAdapter::put_list`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub stored: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub code: String,
    pub error: String,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Write-through, scan-refreshable adapter for one entity table.
pub struct CachedAdapter<R: Record> {
    shape: TableShape,
    store: Arc<dyn BackingStore>,
    search: Arc<SearchIndex>,
    mirror: Option<RwLock<HashMap<String, R>>>,
    projector: Option<TagProjector<R>>,
}

impl<R: Record> std::fmt::Debug for CachedAdapter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedAdapter")
            .field("entity", &R::ENTITY_NAME)
            .field("shape", &self.shape)
            .field("keep_cache", &self.keeps_cache())
            .finish()
    }
}

impl<R: Record> CachedAdapter<R> {
    pub fn shape(&self) -> &TableShape {
        &self.shape
    }

    pub fn keeps_cache(&self) -> bool {
        self.mirror.is_some()
    }

    /// Number of mirrored records (zero when not caching).
    pub fn cached_len(&self) -> HangarResult<usize> {
        match &self.mirror {
            Some(mirror) => Ok(mirror.read().map_err(|_| StorageError::LockPoisoned)?.len()),
            None => Ok(0),
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Canonical record for `code`, or `None`.
    pub async fn get(&self, code: &str) -> HangarResult<Option<R>> {
        if code.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.mirror_get(code)? {
            return Ok(Some(hit));
        }

        let key = self.key_for(code, None);
        let Some(row) = self.store.get_item(&self.shape.table_name, &key).await? else {
            return Ok(None);
        };
        let record = self.decode(row)?;
        if record.code().is_empty() {
            return Ok(None);
        }
        self.mirror_insert(&record)?;
        Ok(Some(record))
    }

    /// Like [`get`](Self::get) but absence is [`StorageError::NotFound`].
    pub async fn fetch(&self, code: &str) -> HangarResult<R> {
        self.get(code).await?.ok_or_else(|| {
            StorageError::NotFound {
                table: self.shape.table_name.clone(),
                code: code.to_string(),
            }
            .into()
        })
    }

    /// Every canonical record, ordered by code.
    pub async fn list(&self) -> HangarResult<Vec<R>> {
        let mut records = match self.mirror_snapshot()? {
            Some(snapshot) => snapshot,
            None => self.scan_canonical().await?,
        };
        records.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(records)
    }

    /// Canonical rows currently in the store, bypassing the mirror.
    pub async fn count_stored(&self) -> HangarResult<usize> {
        Ok(self.scan_canonical().await?.len())
    }

    /// Rows whose sort attribute equals `sort_value`, via the secondary index.
    pub async fn list_by_sort(&self, sort_value: &str) -> HangarResult<Vec<R>> {
        let sort_key = self.require_sort_key("list_by_sort")?;
        let index = self.shape.secondary_index.as_deref().ok_or_else(|| {
            ConfigError::Unsupported {
                table: self.shape.table_name.clone(),
                operation: "list_by_sort".to_string(),
                reason: "no secondary index configured".to_string(),
            }
        })?;

        let rows = self
            .store
            .query(
                &self.shape.table_name,
                Some(index),
                &KeyCondition::eq(sort_key, sort_value),
            )
            .await?;
        rows.into_iter().map(|row| self.decode(row)).collect()
    }

    /// Sort values stored under `code`, excluding the canonical one.
    pub async fn sort_key_list(&self, code: &str) -> HangarResult<Vec<String>> {
        let sort_key = self.require_sort_key("sort_key_list")?.to_string();
        let rows = self
            .store
            .query(
                &self.shape.table_name,
                None,
                &KeyCondition::eq(self.shape.primary_key.clone(), code),
            )
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| string_attr(row, &sort_key))
            .filter(|sort| *sort != code)
            .map(str::to_string)
            .collect())
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Persist the detached form of `record`, then mirror it when canonical.
    pub async fn put(&self, record: &R) -> HangarResult<()> {
        if record.code().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: self.shape.primary_key.clone(),
            }
            .into());
        }
        let stored = record.detached();
        let row = self.encode(&stored)?;
        self.store.put_item(&self.shape.table_name, row).await?;

        if stored.is_canonical() {
            self.mirror_insert(&stored)?;
        }
        tracing::debug!(
            table = %self.shape.table_name,
            code = stored.code(),
            sort = stored.effective_sort_value(),
            "Record stored"
        );
        Ok(())
    }

    /// Sequential puts without atomicity. Every item is attempted.
    pub async fn put_list(&self, records: &[R]) -> BatchReport {
        let mut report = BatchReport::default();
        for record in records {
            match self.put(record).await {
                Ok(()) => report.stored.push(record.code().to_string()),
                Err(err) => {
                    tracing::warn!(
                        table = %self.shape.table_name,
                        code = record.code(),
                        error = %err,
                        "Batch put failed for record"
                    );
                    report.failed.push(BatchFailure {
                        code: record.code().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Delete the canonical row for `code`. Absent rows are not an error.
    pub async fn delete_by_code(&self, code: &str) -> HangarResult<()> {
        let key = self.key_for(code, None);
        self.store.delete_item(&self.shape.table_name, &key).await?;
        self.forget(code)
    }

    /// Delete exactly the `(code, sort_value)` row.
    pub async fn delete_by_code_and_sort(&self, code: &str, sort_value: &str) -> HangarResult<()> {
        self.require_sort_key("delete_by_code_and_sort")?;
        let key = self.key_for(code, Some(sort_value));
        self.store.delete_item(&self.shape.table_name, &key).await?;
        if sort_value == code {
            self.forget(code)?;
        }
        Ok(())
    }

    /// Delete the row `record` addresses.
    pub async fn delete_entity(&self, record: &R) -> HangarResult<()> {
        if self.shape.sort_key.is_some() {
            self.delete_by_code_and_sort(record.code(), record.effective_sort_value())
                .await
        } else {
            self.delete_by_code(record.code()).await
        }
    }

    /// Persist an association row. A record whose sort value is empty or
    /// equal to its code would land on the canonical row, so it is refused.
    pub async fn put_association(&self, record: &R) -> HangarResult<()> {
        let sort_key = self.require_sort_key("put_association")?;
        if record.is_canonical() {
            return Err(self.association_collision(sort_key, record.code()));
        }
        self.put(record).await
    }

    /// Delete one association row, never the canonical row of `code`.
    pub async fn delete_association(&self, code: &str, sort_value: &str) -> HangarResult<()> {
        let sort_key = self.require_sort_key("delete_association")?;
        if sort_value.is_empty() || sort_value == code {
            return Err(self.association_collision(sort_key, code));
        }
        self.delete_by_code_and_sort(code, sort_value).await
    }

    /// Association rows whose sort attribute equals `sort_value`. Unlike
    /// [`list_by_sort`](Self::list_by_sort) this never yields the canonical
    /// row of a record whose code happens to equal `sort_value`.
    pub async fn list_associations(&self, sort_value: &str) -> HangarResult<Vec<R>> {
        Ok(self
            .list_by_sort(sort_value)
            .await?
            .into_iter()
            .filter(|record| !record.is_canonical())
            .collect())
    }

    // ------------------------------------------------------------------------
    // Cache maintenance
    // ------------------------------------------------------------------------

    /// Reload the mirror from the store. No-op when not caching.
    pub async fn reset_cache(&self) -> HangarResult<()> {
        if !self.keeps_cache() {
            return Ok(());
        }
        self.reload_cache().await
    }

    async fn reload_cache(&self) -> HangarResult<()> {
        let records = self.scan_canonical().await?;

        if let Some(mirror) = &self.mirror {
            let fresh: HashMap<String, R> = records
                .iter()
                .map(|r| (r.code().to_string(), r.clone()))
                .collect();
            *mirror.write().map_err(|_| StorageError::LockPoisoned)? = fresh;
        }

        if let Some(projector) = self.projector {
            self.search
                .replace_entity_type(&self.shape.table_name, projector(&records));
        }

        tracing::info!(
            table = %self.shape.table_name,
            records = records.len(),
            "Cache reloaded"
        );
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn scan_canonical(&self) -> HangarResult<Vec<R>> {
        let rows = self.store.scan(&self.shape.table_name).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let record = self.decode(row)?;
            if !record.code().is_empty() && record.is_canonical() {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn require_sort_key(&self, operation: &str) -> HangarResult<&str> {
        self.shape.sort_key.as_deref().ok_or_else(|| {
            ConfigError::Unsupported {
                table: self.shape.table_name.clone(),
                operation: operation.to_string(),
                reason: "no sort key configured".to_string(),
            }
            .into()
        })
    }

    fn association_collision(&self, sort_key: &str, code: &str) -> HangarError {
        ValidationError::InvalidValue {
            field: sort_key.to_string(),
            reason: format!(
                "association on {} must not use the record's own code",
                code
            ),
        }
        .into()
    }

    fn key_for(&self, code: &str, sort_value: Option<&str>) -> KeyMap {
        let mut key = KeyMap::new();
        key.insert(self.shape.primary_key.clone(), code.to_string());
        if let Some(sort_key) = &self.shape.sort_key {
            key.insert(sort_key.clone(), sort_value.unwrap_or(code).to_string());
        }
        key
    }

    fn encode(&self, record: &R) -> HangarResult<Row> {
        let value = serde_json::to_value(record).map_err(|e| StorageError::CorruptRow {
            table: self.shape.table_name.clone(),
            reason: e.to_string(),
        })?;
        let Value::Object(mut row) = value else {
            return Err(StorageError::CorruptRow {
                table: self.shape.table_name.clone(),
                reason: format!("{} does not serialize to an object", record.describe()),
            }
            .into());
        };
        row.insert(
            self.shape.primary_key.clone(),
            Value::String(record.code().to_string()),
        );
        if let Some(sort_key) = &self.shape.sort_key {
            row.insert(
                sort_key.clone(),
                Value::String(record.effective_sort_value().to_string()),
            );
        }
        Ok(row)
    }

    fn decode(&self, mut row: Row) -> HangarResult<R> {
        if let Some(sort_key) = &self.shape.sort_key {
            let canonical = string_attr(&row, sort_key).is_some()
                && string_attr(&row, sort_key) == string_attr(&row, &self.shape.primary_key);
            if canonical {
                row.remove(sort_key);
            }
        }
        serde_json::from_value(Value::Object(row)).map_err(|e| {
            StorageError::CorruptRow {
                table: self.shape.table_name.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn mirror_snapshot(&self) -> HangarResult<Option<Vec<R>>> {
        match &self.mirror {
            Some(mirror) => Ok(Some(
                mirror
                    .read()
                    .map_err(|_| StorageError::LockPoisoned)?
                    .values()
                    .cloned()
                    .collect(),
            )),
            None => Ok(None),
        }
    }

    fn mirror_get(&self, code: &str) -> HangarResult<Option<R>> {
        match &self.mirror {
            Some(mirror) => Ok(mirror
                .read()
                .map_err(|_| StorageError::LockPoisoned)?
                .get(code)
                .cloned()),
            None => Ok(None),
        }
    }

    fn mirror_insert(&self, record: &R) -> HangarResult<()> {
        if let Some(mirror) = &self.mirror {
            mirror
                .write()
                .map_err(|_| StorageError::LockPoisoned)?
                .insert(record.code().to_string(), record.clone());
        }
        Ok(())
    }

    fn forget(&self, code: &str) -> HangarResult<()> {
        if let Some(mirror) = &self.mirror {
            mirror
                .write()
                .map_err(|_| StorageError::LockPoisoned)?
                .remove(code);
        }
        self.search.remove_code(&self.shape.table_name, code);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryBackingStore, TableSchema};
    use async_trait::async_trait;
    use hangar_core::{Country, HangarError, Model, ModelScale};
    use serde_json::json;

    fn stores() -> HangarResult<(Arc<InMemoryBackingStore>, Arc<SearchIndex>)> {
        let store = InMemoryBackingStore::with_tables([
            TableSchema::new("country", "code"),
            TableSchema::new("model", "code")
                .with_sort_key("picture")
                .with_index("picture-code-index", "picture"),
        ])?;
        Ok((Arc::new(store), Arc::new(SearchIndex::new())))
    }

    fn country(code: &str, name: &str) -> Country {
        Country {
            code: code.to_string(),
            continent: "Europe".to_string(),
            name: name.to_string(),
        }
    }

    fn model(code: &str) -> Model {
        Model {
            code: code.to_string(),
            model_make: "gemini".to_string(),
            scale: Some(ModelScale::OneTo400),
            reg: "G-CIVA".to_string(),
            ..Model::default()
        }
    }

    async fn country_adapter(
        store: Arc<InMemoryBackingStore>,
        search: Arc<SearchIndex>,
        keep_cache: bool,
    ) -> HangarResult<CachedAdapter<Country>> {
        AdapterBuilder::new("country", "code")
            .keep_cache(keep_cache)
            .record_tags()
            .configure(store, search)
            .await
    }

    async fn model_adapter(
        store: Arc<InMemoryBackingStore>,
        search: Arc<SearchIndex>,
    ) -> HangarResult<CachedAdapter<Model>> {
        AdapterBuilder::new("model", "code")
            .sort_key("picture")
            .secondary_index("picture-code-index")
            .keep_cache(true)
            .configure(store, search)
            .await
    }

    fn row(value: serde_json::Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    #[tokio::test]
    async fn test_index_without_sort_key_is_rejected() -> HangarResult<()> {
        let (store, search) = stores()?;
        let result = AdapterBuilder::<Country>::new("country", "code")
            .secondary_index("by-name")
            .configure(store, search)
            .await;
        assert!(matches!(
            result,
            Err(HangarError::Config(ConfigError::IncompatibleOptions { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_your_write_through_cache() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = country_adapter(store.clone(), search, true).await?;

        adapter.put(&country("gb", "United Kingdom")).await?;
        assert_eq!(adapter.get("gb").await?, Some(country("gb", "United Kingdom")));
        assert_eq!(adapter.cached_len()?, 1);
        assert_eq!(store.row_count("country")?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_code_is_absent_and_unwritable() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = country_adapter(store, search, true).await?;
        assert!(adapter.get("").await?.is_none());
        assert!(matches!(
            adapter.put(&country("", "Nowhere")).await,
            Err(HangarError::Validation(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_miss_falls_through_to_store_and_populates_mirror() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = country_adapter(store.clone(), search, true).await?;

        store
            .put_item("country", row(json!({"code": "fr", "continent": "Europe", "name": "France"})))
            .await?;
        assert_eq!(adapter.cached_len()?, 0);
        assert_eq!(adapter.get("fr").await?.map(|c| c.name), Some("France".to_string()));
        assert_eq!(adapter.cached_len()?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_maps_absence_to_not_found() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = country_adapter(store, search, false).await?;
        let err = adapter.fetch("zz").await.err();
        assert!(err.map(|e| e.is_not_found()).unwrap_or(false));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = country_adapter(store, search, true).await?;
        adapter.put(&country("gb", "United Kingdom")).await?;

        adapter.delete_by_code("gb").await?;
        adapter.delete_by_code("gb").await?;
        adapter.delete_by_code("never-existed").await?;
        assert!(adapter.get("gb").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_rows_and_rebuilds_search() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = country_adapter(store.clone(), search.clone(), true).await?;
        adapter.put(&country("gb", "United Kingdom")).await?;
        assert!(search.search("united").is_empty());

        store
            .put_item("country", row(json!({"code": "fr", "continent": "Europe", "name": "France"})))
            .await?;
        adapter.reset_cache().await?;

        assert_eq!(adapter.list().await?.len(), 2);
        assert_eq!(search.search("france").len(), 1);
        assert_eq!(search.search("united")[0].entity_type, "country");

        adapter.delete_by_code("fr").await?;
        assert!(search.search("france").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_uncached_list_scans_store() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = country_adapter(store, search, false).await?;
        adapter.put(&country("gb", "United Kingdom")).await?;
        adapter.put(&country("de", "Germany")).await?;
        let codes: Vec<_> = adapter.list().await?.into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["de", "gb"]);
        assert_eq!(adapter.cached_len()?, 0);
        adapter.reset_cache().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_association_rows_stay_out_of_canonical_views() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = model_adapter(store.clone(), search).await?;

        let canonical = model("gemini#1/400#g-civa");
        adapter.put(&canonical).await?;
        adapter
            .put(&Model::picture_link("gemini#1/400#g-civa", "pic-1"))
            .await?;
        adapter
            .put(&Model::picture_link("gemini#1/400#g-civa", "pic-2"))
            .await?;

        assert_eq!(store.row_count("model")?, 3);
        assert_eq!(adapter.cached_len()?, 1);

        let listed = adapter.list().await?;
        assert_eq!(listed, vec![canonical.clone()]);
        assert_eq!(adapter.get("gemini#1/400#g-civa").await?, Some(canonical));

        adapter.reset_cache().await?;
        assert_eq!(adapter.list().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_canonical_row_reads_back_without_picture() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = model_adapter(store.clone(), search).await?;
        adapter.put(&model("m1")).await?;

        let rows = store.scan("model").await?;
        assert_eq!(string_attr(&rows[0], "picture"), Some("m1"));

        let uncached = AdapterBuilder::<Model>::new("model", "code")
            .sort_key("picture")
            .configure(store, Arc::new(SearchIndex::new()))
            .await?;
        let read = uncached.fetch("m1").await?;
        assert!(read.picture.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_sort_key_list_and_list_by_sort() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = model_adapter(store, search).await?;
        adapter.put(&model("m1")).await?;
        adapter.put(&model("m2")).await?;
        adapter.put(&Model::picture_link("m1", "pic-1")).await?;
        adapter.put(&Model::picture_link("m2", "pic-1")).await?;
        adapter.put(&Model::picture_link("m1", "pic-2")).await?;

        assert_eq!(adapter.sort_key_list("m1").await?, vec!["pic-1", "pic-2"]);
        assert!(adapter.sort_key_list("m3").await?.is_empty());

        let linked: Vec<_> = adapter
            .list_by_sort("pic-1")
            .await?
            .into_iter()
            .map(|m| (m.code, m.picture))
            .collect();
        assert_eq!(
            linked,
            vec![
                ("m1".to_string(), "pic-1".to_string()),
                ("m2".to_string(), "pic-1".to_string())
            ]
        );

        adapter.delete_by_code_and_sort("m1", "pic-1").await?;
        assert_eq!(adapter.list_by_sort("pic-1").await?.len(), 1);
        assert!(adapter.get("m1").await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_sort_operations_need_sort_key() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = country_adapter(store, search, true).await?;
        assert!(matches!(
            adapter.sort_key_list("gb").await,
            Err(HangarError::Config(ConfigError::Unsupported { .. }))
        ));
        assert!(matches!(
            adapter.list_by_sort("x").await,
            Err(HangarError::Config(ConfigError::Unsupported { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_entity_uses_sort_value() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = model_adapter(store.clone(), search).await?;
        adapter.put(&model("m1")).await?;
        let link = Model::picture_link("m1", "pic-1");
        adapter.put(&link).await?;

        adapter.delete_entity(&link).await?;
        assert_eq!(store.row_count("model")?, 1);
        assert!(adapter.get("m1").await?.is_some());

        adapter.delete_entity(&model("m1")).await?;
        assert_eq!(store.row_count("model")?, 0);
        assert!(adapter.get("m1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_association_writes_never_touch_canonical_row() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = model_adapter(store.clone(), search).await?;
        adapter.put(&model("m1")).await?;

        let collision = adapter.put_association(&Model::picture_link("m1", "m1")).await;
        assert!(matches!(
            collision,
            Err(HangarError::Validation(ValidationError::InvalidValue { .. }))
        ));
        assert!(adapter.put_association(&Model::picture_link("m1", "")).await.is_err());
        assert!(adapter.delete_association("m1", "m1").await.is_err());

        assert_eq!(store.row_count("model")?, 1);
        assert_eq!(adapter.fetch("m1").await?.reg, "G-CIVA");

        adapter.put_association(&Model::picture_link("m1", "pic-1")).await?;
        adapter.delete_association("m1", "pic-1").await?;
        assert_eq!(store.row_count("model")?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_associations_skips_canonical_row() -> HangarResult<()> {
        let (store, search) = stores()?;
        let adapter = model_adapter(store, search).await?;
        adapter.put(&model("m1")).await?;
        adapter.put(&model("m2")).await?;
        adapter.put_association(&Model::picture_link("m2", "m1")).await?;

        // The index also holds m1's canonical row under "m1".
        assert_eq!(adapter.list_by_sort("m1").await?.len(), 2);
        let links = adapter.list_associations("m1").await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].code, "m2");
        Ok(())
    }

    #[tokio::test]
    async fn test_search_entries_carry_table_name() -> HangarResult<()> {
        let store = Arc::new(InMemoryBackingStore::with_tables([TableSchema::new(
            "dev_country",
            "code",
        )])?);
        let search = Arc::new(SearchIndex::new());
        store
            .put_item(
                "dev_country",
                row(json!({"code": "gb", "continent": "Europe", "name": "United Kingdom"})),
            )
            .await?;
        let adapter = AdapterBuilder::<Country>::new("dev_country", "code")
            .keep_cache(true)
            .record_tags()
            .configure(store, search.clone())
            .await?;

        assert_eq!(search.search("united")[0].entity_type, "dev_country");
        adapter.delete_by_code("gb").await?;
        assert!(search.search("united").is_empty());
        Ok(())
    }

    /// Store that rejects writes for one code.
    struct RejectingStore {
        inner: InMemoryBackingStore,
        reject: String,
    }

    #[async_trait]
    impl BackingStore for RejectingStore {
        async fn scan(&self, table: &str) -> HangarResult<Vec<Row>> {
            self.inner.scan(table).await
        }

        async fn get_item(&self, table: &str, key: &KeyMap) -> HangarResult<Option<Row>> {
            self.inner.get_item(table, key).await
        }

        async fn put_item(&self, table: &str, row: Row) -> HangarResult<()> {
            if string_attr(&row, "code") == Some(self.reject.as_str()) {
                return Err(StorageError::Backend {
                    table: table.to_string(),
                    operation: "put_item".to_string(),
                    reason: "rejected".to_string(),
                }
                .into());
            }
            self.inner.put_item(table, row).await
        }

        async fn delete_item(&self, table: &str, key: &KeyMap) -> HangarResult<()> {
            self.inner.delete_item(table, key).await
        }

        async fn query(
            &self,
            table: &str,
            index: Option<&str>,
            condition: &KeyCondition,
        ) -> HangarResult<Vec<Row>> {
            self.inner.query(table, index, condition).await
        }
    }

    #[tokio::test]
    async fn test_put_list_reports_partial_failure() -> HangarResult<()> {
        let inner = InMemoryBackingStore::with_tables([TableSchema::new("country", "code")])?;
        let store = Arc::new(RejectingStore {
            inner,
            reject: "fr".to_string(),
        });
        let adapter = AdapterBuilder::<Country>::new("country", "code")
            .keep_cache(true)
            .configure(store, Arc::new(SearchIndex::new()))
            .await?;

        let report = adapter
            .put_list(&[country("gb", "UK"), country("fr", "France"), country("de", "Germany")])
            .await;

        assert_eq!(report.stored, vec!["gb", "de"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].code, "fr");
        assert!(!report.is_complete());
        assert!(adapter.get("fr").await?.is_none());
        Ok(())
    }
}
