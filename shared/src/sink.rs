//! Table writers. Both destinations implement one capability so the
//! handler can select a sink by configuration instead of carrying dead
//! code inline.
use async_trait::async_trait;
use log::info;

use crate::errors::PipelineError;
use crate::store::{FlatRecord, ObjectStore, TableStore};
use crate::table::Table;

/// Every key-value record is tagged with the key that triggered the run.
pub const FILENAME_ATTRIBUTE: &str = "filename";

#[async_trait]
pub trait Sink {
    /// Persist the enriched table under the triggering file name.
    async fn write(&self, table: &Table, file_name: &str) -> Result<(), PipelineError>;
}

/// Serializes the table back to CSV and uploads it to the destination
/// bucket, overwriting any object already at that key.
pub struct CsvObjectSink<'a, S> {
    pub store: &'a S,
    pub bucket: &'a str,
}

#[async_trait]
impl<'a, S: ObjectStore + Sync> Sink for CsvObjectSink<'a, S> {
    async fn write(&self, table: &Table, file_name: &str) -> Result<(), PipelineError> {
        let body = table.to_csv()?;
        info!("trying to write to {}", self.bucket);
        self.store
            .upload(self.bucket, file_name, body)
            .await
            .map_err(PipelineError::Write)
    }
}

/// Flattens every row to string attributes and writes one item per row.
/// Disabled by default: at row-level granularity the puts are too
/// expensive for production use.
pub struct KeyValueSink<'a, T> {
    pub store: &'a T,
    pub table_name: &'a str,
}

#[async_trait]
impl<'a, T: TableStore + Sync> Sink for KeyValueSink<'a, T> {
    async fn write(&self, table: &Table, file_name: &str) -> Result<(), PipelineError> {
        let records = flatten(table, file_name);
        info!(
            "trying to write {} records to table {}",
            records.len(),
            self.table_name
        );
        self.store
            .put_items(self.table_name, records)
            .await
            .map_err(PipelineError::Write)
    }
}

/// One string-keyed record per row: the index rejoined as a column, every
/// value rendered to its string form (missing values as the empty string),
/// plus the filename attribute.
fn flatten(table: &Table, file_name: &str) -> Vec<FlatRecord> {
    (0..table.len())
        .map(|row| {
            let mut record = FlatRecord::new();
            record.insert(
                table.index_name().to_string(),
                table.index()[row].clone(),
            );
            for column in table.columns() {
                let value = table
                    .cell(row, column)
                    .map(|c| c.render())
                    .unwrap_or_default();
                record.insert(column.clone(), value);
            }
            record.insert(FILENAME_ATTRIBUTE.to_string(), file_name.to_string());
            record
        })
        .collect()
}
