//! In-memory backing store.
//!
//! Tables must be declared with a [`TableSchema`] before use. Rows are kept
//! ordered by `(partition, sort)` so scans and queries are deterministic.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use hangar_core::{HangarResult, StorageError};

use crate::backend::{string_attr, BackingStore, KeyCondition, KeyMap, Row};

// ============================================================================
// SCHEMA
// ============================================================================

/// Global secondary index declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: String,
    pub partition_key: String,
}

/// Table declaration: partition key, optional sort key, secondary indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
    pub indexes: Vec<IndexSchema>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
            indexes: Vec::new(),
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    pub fn with_index(mut self, name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        self.indexes.push(IndexSchema {
            name: name.into(),
            partition_key: partition_key.into(),
        });
        self
    }
}

type RowKey = (String, String);

#[derive(Debug)]
struct Table {
    schema: TableSchema,
    rows: BTreeMap<RowKey, Row>,
}

impl Table {
    fn key_from_map(&self, key: &KeyMap) -> HangarResult<RowKey> {
        let partition = key.get(&self.schema.partition_key).ok_or_else(|| {
            StorageError::InvalidKey {
                table: self.schema.name.clone(),
                reason: format!("missing partition key {}", self.schema.partition_key),
            }
        })?;
        let sort = match &self.schema.sort_key {
            Some(sort_key) => key.get(sort_key).cloned().ok_or_else(|| {
                StorageError::InvalidKey {
                    table: self.schema.name.clone(),
                    reason: format!("missing sort key {}", sort_key),
                }
            })?,
            None => String::new(),
        };
        Ok((partition.clone(), sort))
    }

    fn key_from_row(&self, row: &Row) -> HangarResult<RowKey> {
        let mut key = KeyMap::new();
        for attribute in std::iter::once(&self.schema.partition_key).chain(&self.schema.sort_key) {
            if let Some(value) = string_attr(row, attribute) {
                key.insert(attribute.clone(), value.to_string());
            }
        }
        self.key_from_map(&key)
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Thread-safe in-memory [`BackingStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackingStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryBackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given tables already declared.
    pub fn with_tables(schemas: impl IntoIterator<Item = TableSchema>) -> HangarResult<Self> {
        let store = Self::new();
        for schema in schemas {
            store.create_table(schema)?;
        }
        Ok(store)
    }

    /// Declare a table. Re-declaring an existing table keeps its rows.
    pub fn create_table(&self, schema: TableSchema) -> HangarResult<()> {
        let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
        tables
            .entry(schema.name.clone())
            .and_modify(|table| table.schema = schema.clone())
            .or_insert_with(|| Table {
                schema,
                rows: BTreeMap::new(),
            });
        Ok(())
    }

    /// Number of rows currently held by `table`.
    pub fn row_count(&self, table: &str) -> HangarResult<usize> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(tables.get(table).map(|t| t.rows.len()).unwrap_or(0))
    }

    fn with_table<T>(&self, table: &str, f: impl FnOnce(&Table) -> HangarResult<T>) -> HangarResult<T> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        let found = tables.get(table).ok_or_else(|| StorageError::TableNotFound {
            table: table.to_string(),
        })?;
        f(found)
    }

    fn with_table_mut<T>(
        &self,
        table: &str,
        f: impl FnOnce(&mut Table) -> HangarResult<T>,
    ) -> HangarResult<T> {
        let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
        let found = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound {
                table: table.to_string(),
            })?;
        f(found)
    }
}

#[async_trait]
impl BackingStore for InMemoryBackingStore {
    async fn scan(&self, table: &str) -> HangarResult<Vec<Row>> {
        self.with_table(table, |t| Ok(t.rows.values().cloned().collect()))
    }

    async fn get_item(&self, table: &str, key: &KeyMap) -> HangarResult<Option<Row>> {
        self.with_table(table, |t| {
            let row_key = t.key_from_map(key)?;
            Ok(t.rows.get(&row_key).cloned())
        })
    }

    async fn put_item(&self, table: &str, row: Row) -> HangarResult<()> {
        self.with_table_mut(table, |t| {
            let row_key = t.key_from_row(&row)?;
            t.rows.insert(row_key, row);
            Ok(())
        })
    }

    async fn delete_item(&self, table: &str, key: &KeyMap) -> HangarResult<()> {
        self.with_table_mut(table, |t| {
            let row_key = t.key_from_map(key)?;
            t.rows.remove(&row_key);
            Ok(())
        })
    }

    async fn query(
        &self,
        table: &str,
        index: Option<&str>,
        condition: &KeyCondition,
    ) -> HangarResult<Vec<Row>> {
        self.with_table(table, |t| {
            let partition_attr = match index {
                None => t.schema.partition_key.as_str(),
                Some(name) => t
                    .schema
                    .indexes
                    .iter()
                    .find(|ix| ix.name == name)
                    .map(|ix| ix.partition_key.as_str())
                    .ok_or_else(|| StorageError::Backend {
                        table: table.to_string(),
                        operation: "query".to_string(),
                        reason: format!("unknown index {}", name),
                    })?,
            };
            if partition_attr != condition.attribute {
                return Err(StorageError::Backend {
                    table: table.to_string(),
                    operation: "query".to_string(),
                    reason: format!(
                        "condition on {} does not match partition key {}",
                        condition.attribute, partition_attr
                    ),
                }
                .into());
            }
            Ok(t
                .rows
                .values()
                .filter(|row| string_attr(row, partition_attr) == Some(condition.value.as_str()))
                .cloned()
                .collect())
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_core::HangarError;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    fn key(pairs: &[(&str, &str)]) -> KeyMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn model_store() -> HangarResult<InMemoryBackingStore> {
        InMemoryBackingStore::with_tables([TableSchema::new("model", "code")
            .with_sort_key("picture")
            .with_index("picture-code-index", "picture")])
    }

    #[tokio::test]
    async fn test_put_get_delete_simple_table() -> HangarResult<()> {
        let store = InMemoryBackingStore::with_tables([TableSchema::new("country", "code")])?;
        store
            .put_item("country", row(json!({"code": "gb", "name": "United Kingdom"})))
            .await?;

        let found = store.get_item("country", &key(&[("code", "gb")])).await?;
        assert_eq!(found.and_then(|r| r.get("name").cloned()), Some(json!("United Kingdom")));

        store.delete_item("country", &key(&[("code", "gb")])).await?;
        store.delete_item("country", &key(&[("code", "gb")])).await?;
        assert!(store.get_item("country", &key(&[("code", "gb")])).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_table_is_an_error() {
        let store = InMemoryBackingStore::new();
        let result = store.scan("nope").await;
        assert!(matches!(
            result,
            Err(HangarError::Storage(StorageError::TableNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_sort_keyed_table_requires_sort_key() -> HangarResult<()> {
        let store = model_store()?;
        let result = store.get_item("model", &key(&[("code", "m1")])).await;
        assert!(matches!(
            result,
            Err(HangarError::Storage(StorageError::InvalidKey { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_query_partition_and_index() -> HangarResult<()> {
        let store = model_store()?;
        store.put_item("model", row(json!({"code": "m1", "picture": "m1"}))).await?;
        store.put_item("model", row(json!({"code": "m1", "picture": "p1"}))).await?;
        store.put_item("model", row(json!({"code": "m2", "picture": "p1"}))).await?;

        let by_code = store
            .query("model", None, &KeyCondition::eq("code", "m1"))
            .await?;
        assert_eq!(by_code.len(), 2);

        let by_picture = store
            .query("model", Some("picture-code-index"), &KeyCondition::eq("picture", "p1"))
            .await?;
        let codes: Vec<_> = by_picture
            .iter()
            .filter_map(|r| string_attr(r, "code"))
            .collect();
        assert_eq!(codes, vec!["m1", "m2"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_unknown_index_fails() -> HangarResult<()> {
        let store = model_store()?;
        let result = store
            .query("model", Some("missing"), &KeyCondition::eq("picture", "p1"))
            .await;
        assert!(matches!(
            result,
            Err(HangarError::Storage(StorageError::Backend { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_redeclaring_table_keeps_rows() -> HangarResult<()> {
        let store = InMemoryBackingStore::with_tables([TableSchema::new("country", "code")])?;
        store.put_item("country", row(json!({"code": "fr"}))).await?;
        store.create_table(TableSchema::new("country", "code"))?;
        assert_eq!(store.row_count("country")?, 1);
        Ok(())
    }
}
