//! Loader module for the search sync.
//!
//! Assembles the operations of an invocation, applies index settings and
//! submits the batch to the search service.

mod batch;
mod settings;

pub use batch::{AssembledBatch, BatchAssembler, BatchStats, SettingsTarget};
pub use settings::apply_index_settings;

use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::errors::IngestError;
use search_sync_repository::{BatchOperationSummary, SearchIndexProvider};

/// Loader that pushes assembled batches into the search service.
///
/// The loader is responsible for:
/// - Applying the resolved index settings before the batch
/// - Submitting all operations in a single batch call
pub struct SearchLoader {
    provider: Arc<dyn SearchIndexProvider>,
}

impl SearchLoader {
    /// Create a new search loader with the given provider.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self { provider }
    }

    /// Load an assembled batch.
    ///
    /// An empty batch makes no remote call. Otherwise the settings target, if
    /// any, is applied first and the operations are submitted as one batch.
    /// Returns once the search service has acknowledged both.
    #[instrument(skip(self, batch), fields(operation_count = batch.operations.len()))]
    pub async fn load(&self, batch: AssembledBatch) -> Result<BatchOperationSummary, IngestError> {
        if batch.is_empty() {
            debug!("No operations to submit");
            return Ok(BatchOperationSummary::default());
        }

        if let Some(target) = &batch.settings_target {
            apply_index_settings(
                self.provider.as_ref(),
                &target.index_name,
                Some(&target.settings),
            )
            .await?;
        }

        let stats = batch.stats;
        match self.provider.batch(&batch.operations).await {
            Ok(summary) => {
                info!(
                    modified = stats.modified(),
                    inserted = stats.inserts,
                    updated = stats.updates,
                    removed = stats.deletes,
                    unsupported = stats.unsupported,
                    skipped = stats.skipped,
                    indices = ?summary.indices,
                    "Batch submitted"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, count = batch.operations.len(), "Failed to submit batch");
                Err(e.into())
            }
        }
    }
}
