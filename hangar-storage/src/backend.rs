//! Backing key-value store contract.
//!
//! Rows are flat JSON objects. Keys are attribute-name to string-value maps
//! holding the partition key and, for sort-keyed tables, the sort key.

use std::collections::BTreeMap;

use async_trait::async_trait;
use hangar_core::HangarResult;
use serde_json::{Map, Value};

/// One persisted row: every entity field flattened into a JSON object.
pub type Row = Map<String, Value>;

/// Primary key of a row: `{partition_attr: value}` plus `{sort_attr: value}`.
pub type KeyMap = BTreeMap<String, String>;

/// Equality condition on the partition attribute of a table or index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    pub attribute: String,
    pub value: String,
}

impl KeyCondition {
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Key-value store with composite keys and global secondary indexes.
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Every row of `table`, in no guaranteed order.
    async fn scan(&self, table: &str) -> HangarResult<Vec<Row>>;

    /// Point read. Absence is `Ok(None)`, never an error.
    async fn get_item(&self, table: &str, key: &KeyMap) -> HangarResult<Option<Row>>;

    /// Insert or replace the row addressed by its key attributes.
    async fn put_item(&self, table: &str, row: Row) -> HangarResult<()>;

    /// Delete one row. Deleting an absent row succeeds.
    async fn delete_item(&self, table: &str, key: &KeyMap) -> HangarResult<()>;

    /// Rows whose partition attribute matches `condition`.
    ///
    /// With `index: None` the table's own partition key is queried, otherwise
    /// the named secondary index.
    async fn query(
        &self,
        table: &str,
        index: Option<&str>,
        condition: &KeyCondition,
    ) -> HangarResult<Vec<Row>>;
}

/// Read a string attribute from a row.
pub fn string_attr<'a>(row: &'a Row, attribute: &str) -> Option<&'a str> {
    row.get(attribute).and_then(Value::as_str)
}
