//! Import Service
//!
//! Bulk loading of a collection from a JSON array. Records are normalized
//! by the entity's `prepare_import`, validated one by one, and written with
//! a sequential batch put. Nothing is rolled back: the report lists what
//! was stored and what failed.

use hangar_core::Record;
use hangar_storage::{BatchFailure, BatchReport};

use crate::catalog::Catalog;
use crate::component::CatalogEntity;
use crate::error::ApiResult;

pub async fn import_records<C: CatalogEntity>(
    catalog: &Catalog,
    records: Vec<C>,
) -> ApiResult<BatchReport> {
    let received = records.len();
    let records = C::prepare_import(catalog, records).await?;

    let mut accepted = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for mut record in records {
        match record.validate_for_write(catalog).await {
            Ok(()) => accepted.push(record),
            Err(err) => {
                tracing::warn!(
                    collection = C::COLLECTION,
                    record = %record.describe(),
                    error = %err,
                    "Import record rejected"
                );
                rejected.push(BatchFailure {
                    code: record.code().to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    let mut report = C::adapter(catalog).put_list(&accepted).await;
    report.failed.extend(rejected);

    tracing::info!(
        collection = C::COLLECTION,
        received,
        stored = report.stored.len(),
        failed = report.failed.len(),
        "Import finished"
    );
    Ok(report)
}
