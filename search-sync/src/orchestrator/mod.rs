//! Orchestrator module for the search sync.
//!
//! Coordinates the consumer, processor, and loader components for one
//! invocation at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::config::{Config, IndexMode};
use crate::consumer::{Classification, InvocationEvent, RecordClassifier};
use crate::errors::IngestError;
use crate::loader::{BatchAssembler, BatchStats, SearchLoader};
use crate::processor::RecordProcessor;
use search_sync_repository::{BatchOperationSummary, SearchIndexProvider};

/// What one invocation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationReport {
    /// Number of change records received.
    pub records: usize,
    pub stats: BatchStats,
    pub summary: BatchOperationSummary,
}

/// Result of an invocation as seen by the caller.
///
/// Failures are reported here rather than raised, so the stream is never
/// blocked by a batch that cannot be indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Completed(InvocationReport),
    Failed { error: String },
}

impl InvocationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Orchestrator that runs the ingest components for each invocation.
///
/// The orchestrator:
/// - Parses and classifies the change records of an invocation
/// - Processes them into index operations and assembles the batch
/// - Hands the batch to the loader
/// - Logs and suppresses any failure at the invocation boundary
pub struct Orchestrator {
    classifier: RecordClassifier,
    processor: RecordProcessor,
    loader: SearchLoader,
    /// Configuration shared with the rest of the process.
    config: Arc<Config>,
    /// Total number of invocations handled since startup.
    total_invocations: AtomicU64,
    /// Total number of operations submitted since startup.
    total_operations: AtomicU64,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        classifier: RecordClassifier,
        processor: RecordProcessor,
        loader: SearchLoader,
        config: Arc<Config>,
    ) -> Self {
        Self {
            classifier,
            processor,
            loader,
            config,
            total_invocations: AtomicU64::new(0),
            total_operations: AtomicU64::new(0),
        }
    }

    /// Build the components described by `config` around a search provider.
    pub fn from_config(config: Arc<Config>, provider: Arc<dyn SearchIndexProvider>) -> Self {
        let type_field = match config.index_mode {
            IndexMode::PerType => Some(config.type_field.clone()),
            IndexMode::Global { .. } => None,
        };

        Self::new(
            RecordClassifier::new(config.index_mode.clone(), config.type_field.clone()),
            RecordProcessor::new(config.fields.clone(), type_field),
            SearchLoader::new(provider),
            config,
        )
    }

    /// Handle one invocation payload.
    ///
    /// Never fails: errors are logged and returned as
    /// [`InvocationOutcome::Failed`].
    pub async fn handle(&self, event: Value) -> InvocationOutcome {
        let invocation = self.total_invocations.fetch_add(1, Ordering::Relaxed) + 1;

        match self.process(event).await {
            Ok(report) => {
                let total = self
                    .total_operations
                    .fetch_add(report.summary.total as u64, Ordering::Relaxed)
                    + report.summary.total as u64;
                info!(
                    invocation = invocation,
                    records = report.records,
                    operations = report.summary.total,
                    total_operations = total,
                    "Invocation completed"
                );
                InvocationOutcome::Completed(report)
            }
            Err(e) => {
                error!(invocation = invocation, error = %e, "Invocation failed");
                InvocationOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Run one invocation through the ingest.
    ///
    /// Returns only after the search service has acknowledged the settings
    /// and the batch.
    #[instrument(skip(self, event))]
    pub async fn process(&self, event: Value) -> Result<InvocationReport, IngestError> {
        let event = InvocationEvent::from_value(event)?;
        let records = event.records.len();
        debug!(record_count = records, "Processing invocation");

        let mut assembler = BatchAssembler::new();
        for record in event.records {
            match self.classifier.classify(record)? {
                Classification::Record(record) => assembler.push(self.processor.process(record)),
                Classification::Skipped { reason, kind } => assembler.skip(&reason, kind),
            }
        }

        let batch = assembler.finish(self.config.settings.as_ref());
        let stats = batch.stats;
        let summary = self.loader.load(batch).await?;

        Ok(InvocationReport {
            records,
            stats,
            summary,
        })
    }
}
