//! Project-specific model definitions
//!
use serde::Serialize;

/// Returned to the runtime only when every phase succeeded.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub req_id: String,
    pub msg: String,
}
