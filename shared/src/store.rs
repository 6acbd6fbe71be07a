//! Seams over the backing stores. The lambda owns real SDK clients for the
//! life of the process (connection reuse only, they carry no data) and
//! hands them in by reference; tests substitute in-memory fakes.
use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_s3::primitives::ByteStream;
use log::error;
use serde_dynamo::aws_sdk_dynamodb_0_25::to_item;

/// One row flattened to string attributes for the key-value sink.
pub type FlatRecord = BTreeMap<String, String>;

/// DynamoDB rejects batch writes of more than 25 items.
const BATCH_WRITE_LIMIT: usize = 25;

#[async_trait]
pub trait ObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    async fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}

#[async_trait]
impl ObjectStore for aws_sdk_s3::Client {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let object = self
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!("error downloading {} from S3: {}", key, e);
                e
            })?;
        let bytes = object.body.collect().await?.into_bytes();
        Ok(bytes.to_vec())
    }

    async fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        // everything this pipeline uploads is delimited text
        self.put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("text/csv")
            .send()
            .await
            .map_err(|e| {
                error!("error putting {} to S3: {}", key, e);
                e
            })?;
        Ok(())
    }
}

#[async_trait]
pub trait TableStore {
    async fn put_items(&self, table_name: &str, items: Vec<FlatRecord>) -> Result<()>;
}

#[async_trait]
impl TableStore for aws_sdk_dynamodb::Client {
    async fn put_items(&self, table_name: &str, items: Vec<FlatRecord>) -> Result<()> {
        for chunk in items.chunks(BATCH_WRITE_LIMIT) {
            let requests = chunk
                .iter()
                .map(|record| {
                    let item: HashMap<String, AttributeValue> = to_item(record)?;
                    Ok(WriteRequest::builder()
                        .put_request(PutRequest::builder().set_item(Some(item)).build())
                        .build())
                })
                .collect::<Result<Vec<_>>>()?;
            let output = self
                .batch_write_item()
                .request_items(table_name, requests)
                .send()
                .await?;
            // a failed or partial batch aborts the load; earlier batches
            // stay written, there is no rollback
            if let Some(unprocessed) = output.unprocessed_items() {
                if !unprocessed.is_empty() {
                    return Err(anyhow!(
                        "{} items in batch to {} were not processed",
                        unprocessed.values().map(Vec::len).sum::<usize>(),
                        table_name
                    ));
                }
            }
        }
        Ok(())
    }
}
