use thiserror::Error;

/// The pipeline's error taxonomy. Nothing is recovered internally: every
/// variant is logged once by the invocation handler and then re-raised to
/// the hosting runtime, which applies its own retry/dead-letter policy.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source object missing, inaccessible, or bucket/region mismatch.
    #[error("failed to fetch source object: {0}")]
    Fetch(anyhow::Error),

    /// Malformed delimited text, or the index column is absent.
    #[error("failed to parse source object: {0}")]
    Parse(String),

    /// Malformed compound fields beyond the tolerated missing-value cases.
    #[error("failed to transform table: {0}")]
    Transform(String),

    /// Destination unreachable, permission denied, quota exceeded.
    #[error("failed to write to destination: {0}")]
    Write(anyhow::Error),
}
