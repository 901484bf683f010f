//! Entity contract shared by every catalogue collection.
//!
//! Each entity type implements [`CatalogEntity`], which ties the record to
//! its adapter inside the [`Catalog`] and describes how its foreign keys are
//! resolved. The generic route handlers and the import service are written
//! purely against this trait.
//!
//! # Reference resolution
//!
//! Foreign keys are resolved through the referenced type's
//! [`CatalogEntity::get_by_code`], so nested references (an airplane's make
//! and that make's country) are filled recursively.
//!
//! - On reads a key that no longer resolves is an integrity violation
//!   ([`StorageError::DanglingReference`]).
//! - On writes the same condition is rejected as
//!   [`ValidationError::UnknownReference`] before anything is stored.

use async_trait::async_trait;
use hangar_core::{HangarError, HangarResult, Record, StorageError, ValidationError};
use hangar_storage::CachedAdapter;

use crate::catalog::Catalog;

// ============================================================================
// CATALOG ENTITY TRAIT
// ============================================================================

#[async_trait]
pub trait CatalogEntity: Record + std::fmt::Debug {
    /// Path segment the collection is served under.
    const COLLECTION: &'static str;

    /// Adapter fronting this entity's table.
    fn adapter(catalog: &Catalog) -> &CachedAdapter<Self>;

    /// Fill the `*_details` fields from the referenced records.
    async fn resolve_references(&mut self, _catalog: &Catalog) -> HangarResult<()> {
        Ok(())
    }

    /// Canonical record for `code` with references resolved.
    async fn get_by_code(catalog: &Catalog, code: &str) -> HangarResult<Option<Self>> {
        let Some(mut record) = Self::adapter(catalog).get(code).await? else {
            return Ok(None);
        };
        record.resolve_references(catalog).await?;
        Ok(Some(record))
    }

    /// Every canonical record with references resolved.
    async fn list(catalog: &Catalog) -> HangarResult<Vec<Self>> {
        let mut records = Self::adapter(catalog).list().await?;
        for record in records.iter_mut() {
            record.resolve_references(catalog).await?;
        }
        Ok(records)
    }

    /// Normalize the record and check every foreign key exists.
    async fn validate_for_write(&mut self, catalog: &Catalog) -> HangarResult<()> {
        self.prepare_for_write()?;
        self.resolve_references(catalog)
            .await
            .map_err(unknown_reference::<Self>)
    }

    /// Validate and store `record`, returning it with references resolved.
    async fn put(catalog: &Catalog, mut record: Self) -> HangarResult<Self> {
        record.validate_for_write(catalog).await?;
        Self::adapter(catalog).put(&record).await?;
        tracing::info!(
            collection = Self::COLLECTION,
            code = record.code(),
            "Entity stored"
        );
        Ok(record)
    }

    /// Remove the canonical record for `code`. Absence is not an error.
    async fn delete(catalog: &Catalog, code: &str) -> HangarResult<()> {
        Self::adapter(catalog).delete_by_code(code).await?;
        tracing::info!(collection = Self::COLLECTION, code, "Entity deleted");
        Ok(())
    }

    /// Normalize a bulk-loaded batch before it is validated and written.
    async fn prepare_import(_catalog: &Catalog, records: Vec<Self>) -> HangarResult<Vec<Self>> {
        Ok(records)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Resolve one foreign key of an `owner` record.
///
/// An empty key is "no reference" and yields `None`.
pub async fn resolve_ref<T: CatalogEntity>(
    catalog: &Catalog,
    owner: &str,
    field: &str,
    code: &str,
) -> HangarResult<Option<T>> {
    if code.is_empty() {
        return Ok(None);
    }
    match T::get_by_code(catalog, code).await? {
        Some(found) => Ok(Some(found)),
        None => {
            tracing::error!(
                entity = owner,
                field,
                code,
                referenced = T::ENTITY_NAME,
                "Reference does not resolve"
            );
            Err(StorageError::DanglingReference {
                entity: owner.to_string(),
                field: field.to_string(),
                code: code.to_string(),
            }
            .into())
        }
    }
}

/// Dangling keys on the record being written are the caller's fault.
/// Dangling keys further down the chain stay integrity violations.
fn unknown_reference<R: Record>(err: HangarError) -> HangarError {
    match err {
        HangarError::Storage(StorageError::DanglingReference {
            entity,
            field,
            code,
        }) if entity == R::ENTITY_NAME => ValidationError::UnknownReference {
            entity: field.clone(),
            field,
            code,
        }
        .into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_core::{Airline, Country};

    #[test]
    fn test_own_dangling_reference_becomes_validation_error() {
        let err: HangarError = StorageError::DanglingReference {
            entity: "airline".to_string(),
            field: "country".to_string(),
            code: "zz".to_string(),
        }
        .into();
        assert!(matches!(
            unknown_reference::<Airline>(err),
            HangarError::Validation(ValidationError::UnknownReference { .. })
        ));
    }

    #[test]
    fn test_nested_dangling_reference_is_kept() {
        let err: HangarError = StorageError::DanglingReference {
            entity: "airline".to_string(),
            field: "country".to_string(),
            code: "zz".to_string(),
        }
        .into();
        assert!(matches!(
            unknown_reference::<Country>(err),
            HangarError::Storage(StorageError::DanglingReference { .. })
        ));
    }
}
