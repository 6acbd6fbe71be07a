//! Shared utilities
//!
use std::time::Instant;

use log::info;
use tracing_subscriber::EnvFilter;

pub fn setup_logging() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // Setup from the environment (RUST_LOG)
        .with_env_filter(EnvFilter::from_default_env())
        // this needs to be set to false, otherwise ANSI color codes will
        // show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();
}

/// Scoped phase timing: logs the elapsed time when dropped, whether the
/// phase succeeded or bailed out early with `?`.
pub struct PhaseTimer {
    name: &'static str,
    start: Instant,
}

impl PhaseTimer {
    pub fn new(name: &'static str) -> Self {
        PhaseTimer {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        info!("{} took {:.3?}", self.name, self.start.elapsed());
    }
}
