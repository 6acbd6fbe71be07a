//! Project-specific model definitions
//!
use std::env;

/// Column whose values uniquely identify each row; preserved verbatim
/// through the whole pipeline.
pub const INDEX_COLUMN: &str = "PassengerId";

const DEFAULT_DESTINATION_BUCKET: &str = "sst-output";
const DEFAULT_DESTINATION_TABLE: &str = "sst-outputs";

/// Which table writer the handler loads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// CSV upload to the destination bucket (the default pipeline).
    ObjectStore,
    /// One put-item per row into the destination table. Kept as an
    /// illustrative alternate sink; row-level puts are too expensive to be
    /// the default.
    KeyValue,
}

#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub destination_bucket: String,
    pub destination_table: String,
    pub sink: SinkKind,
}

impl EtlConfig {
    /// Read configuration from the environment, falling back to the fixed
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let destination_bucket = env::var("DESTINATION_BUCKET")
            .unwrap_or_else(|_| DEFAULT_DESTINATION_BUCKET.to_string());
        let destination_table = env::var("DESTINATION_TABLE")
            .unwrap_or_else(|_| DEFAULT_DESTINATION_TABLE.to_string());
        let sink = match env::var("DESTINATION_SINK").as_deref() {
            Ok("dynamodb") => SinkKind::KeyValue,
            _ => SinkKind::ObjectStore,
        };
        EtlConfig {
            destination_bucket,
            destination_table,
            sink,
        }
    }
}
