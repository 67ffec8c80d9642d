//! # Search Sync
//!
//! Change-stream to search-index sync: each invocation receives a batch of
//! DynamoDB stream records (or Kinesis replays of them) and turns them into one
//! batch of search index operations.
//!
//! ## Architecture
//!
//! The sync follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Parses change records and classifies each one
//! 2. **Processor**: Projects fields and derives object identities
//! 3. **Loader**: Assembles the batch, applies index settings, submits it
//! 4. **Orchestrator**: Runs one invocation and suppresses its failures
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and dependency wiring
//! - [`consumer`]: Change-record wire model and record classifier
//! - [`processor`]: Field projection and object identity
//! - [`loader`]: Batch assembly, settings application and submission
//! - [`orchestrator`]: The invocation boundary
//! - [`errors`]: Error types for the pipeline

pub mod config;
pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use config::{Config, Dependencies};
pub use errors::IngestError;

use thiserror::Error;

/// Errors that can occur during startup or while driving invocations.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),

    /// Failed to read invocation payloads.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
