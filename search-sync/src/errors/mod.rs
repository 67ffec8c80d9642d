//! Error types for the search sync pipeline.

use search_sync_repository::SearchIndexError;
use thiserror::Error;

/// Errors that abort the processing of one invocation.
///
/// Per-record data problems are not errors: those records are skipped. These
/// variants cover structural failures and remote-call failures, which the
/// orchestrator logs and suppresses at the invocation boundary.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Error parsing or decoding the invocation payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error returned by the search service.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] SearchIndexError),
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<base64::DecodeError> for IngestError {
    fn from(err: base64::DecodeError) -> Self {
        Self::ParseError(format!("invalid base64 payload: {}", err))
    }
}
