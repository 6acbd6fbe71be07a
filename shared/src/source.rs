//! The record reader: one object-store read, parsed into a [`Table`].
use log::info;

use crate::errors::PipelineError;
use crate::models::INDEX_COLUMN;
use crate::store::ObjectStore;
use crate::table::Table;

/// Fetch `s3://{bucket}/{key}` and parse it as headered CSV keyed by the
/// index column. Fetch and parse failures propagate unmodified; there is
/// no retry.
pub async fn extract<S: ObjectStore + Sync>(
    store: &S,
    bucket: &str,
    key: &str,
) -> Result<Table, PipelineError> {
    info!("trying to load {} from {}", key, bucket);
    let bytes = store.fetch(bucket, key).await.map_err(PipelineError::Fetch)?;
    Table::from_csv(&bytes, INDEX_COLUMN)
}
