//! Search index error types.
//!
//! This module defines the unified error type for all calls to the remote
//! search service, including transport failures and rejected requests.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait for both outbound calls. A failed
/// batch is reported as a whole: individual operations inside a rejected batch
/// are not retried or split out.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., missing credentials, operation without objectID).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to build a client for the search service.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to push index settings.
    #[error("Settings error: {0}")]
    SettingsError(String),

    /// Failed to submit a batch of index operations.
    #[error("Batch error: {0}")]
    BatchError(String),

    /// Failed while waiting for the service to acknowledge a task.
    #[error("Task error: {0}")]
    TaskError(String),

    /// Failed to parse a response from the search service.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a settings error.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::SettingsError(msg.into())
    }

    /// Create a batch error.
    pub fn batch(msg: impl Into<String>) -> Self {
        Self::BatchError(msg.into())
    }

    /// Create a task error.
    pub fn task(msg: impl Into<String>) -> Self {
        Self::TaskError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
