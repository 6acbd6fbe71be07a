//! Lambda entry point: on an object-created notification, read the CSV,
//! derive the enrichment columns, and load the result into the configured
//! sink. One linear pass per invocation; any failure is logged and
//! re-raised so the runtime's own retry/dead-letter policy applies.
mod models;

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use log::error;

use models::SuccessResponse;
use shared::errors::PipelineError;
use shared::sink::{CsvObjectSink, KeyValueSink, Sink};
use shared::source;
use shared::store::{ObjectStore, TableStore};
use shared::transform::derive_fields;
use shared::{setup_logging, EtlConfig, PhaseTimer, SinkKind};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    setup_logging();

    let config = EtlConfig::from_env();
    let aws_config = aws_config::load_from_env().await;
    let s3 = aws_sdk_s3::Client::new(&aws_config);
    let dynamodb = aws_sdk_dynamodb::Client::new(&aws_config);

    run(service_fn(|event: LambdaEvent<S3Event>| {
        handler(event, &s3, &dynamodb, &config)
    }))
    .await
}

async fn handler(
    event: LambdaEvent<S3Event>,
    s3: &aws_sdk_s3::Client,
    dynamodb: &aws_sdk_dynamodb::Client,
    config: &EtlConfig,
) -> Result<SuccessResponse, LambdaError> {
    let (bucket, key) = triggering_object(&event.payload)?;

    match run_pipeline(s3, dynamodb, config, &bucket, &key).await {
        Ok(()) => Ok(SuccessResponse {
            req_id: event.context.request_id,
            msg: format!("enriched {} from {}", key, bucket),
        }),
        Err(e) => {
            error!("{}", e);
            error!(
                "error processing object {} from bucket {}; make sure they exist and the \
                 bucket is in the same region as this function",
                key, bucket
            );
            Err(e.into())
        }
    }
}

/// Extract → transform → load, each phase timed. Exactly one transition
/// path: the first error aborts the invocation and discards all work.
async fn run_pipeline<S, T>(
    store: &S,
    tables: &T,
    config: &EtlConfig,
    bucket: &str,
    key: &str,
) -> Result<(), PipelineError>
where
    S: ObjectStore + Sync,
    T: TableStore + Sync,
{
    let table = {
        let _timer = PhaseTimer::new("extracting");
        source::extract(store, bucket, key).await?
    };

    let enriched = {
        let _timer = PhaseTimer::new("transforming");
        derive_fields(&table)?
    };

    let _timer = PhaseTimer::new("loading");
    match config.sink {
        SinkKind::ObjectStore => {
            CsvObjectSink {
                store,
                bucket: &config.destination_bucket,
            }
            .write(&enriched, key)
            .await
        }
        SinkKind::KeyValue => {
            KeyValueSink {
                store: tables,
                table_name: &config.destination_table,
            }
            .write(&enriched, key)
            .await
        }
    }
}

/// Bucket name and percent-decoded key from the first record of the event.
fn triggering_object(event: &S3Event) -> Result<(String, String), LambdaError> {
    let record = event.records.first().ok_or("event contained no records")?;
    let bucket = record
        .s3
        .bucket
        .name
        .clone()
        .ok_or("event record has no bucket name")?;
    let key = record
        .s3
        .object
        .key
        .as_deref()
        .ok_or("event record has no object key")?;
    Ok((bucket, decode_key(key)?))
}

/// S3 notifications encode keys with `+` for spaces on top of the usual
/// percent-escapes.
fn decode_key(key: &str) -> Result<String, LambdaError> {
    let key = key.replace('+', " ");
    Ok(urlencoding::decode(&key)?.into_owned())
}
