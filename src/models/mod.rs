mod request_options;

pub use request_options::*;

use crate::api_client::api_models::RawResponse;
use serde::{Deserialize, Serialize};

/// The uniform body of every non-binary success response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    pub msg: Option<String>,
    pub data: T,
}

/// Result of one dispatch, shaped by the requested response type.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched<T> {
    Envelope(ApiResponse<T>),
    Raw(RawResponse),
}

impl<T> Dispatched<T> {
    pub fn envelope(self) -> Option<ApiResponse<T>> {
        match self {
            Dispatched::Envelope(envelope) => Some(envelope),
            Dispatched::Raw(_) => None,
        }
    }

    pub fn raw(self) -> Option<RawResponse> {
        match self {
            Dispatched::Raw(raw) => Some(raw),
            Dispatched::Envelope(_) => None,
        }
    }
}

// Last-used display/format preferences, for layers outside the pipeline
// (e.g. a notifier deciding whether to surface messages).
// The pipeline itself only reads the per-call context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessConfig {
    pub show_message: bool,
    pub response_type: ResponseType,
}
