//! Search index provider trait definition.
//!
//! This module defines the abstract interface for the two outbound calls made
//! by the sync: pushing index settings and submitting a batch of operations.

use async_trait::async_trait;
use search_sync_shared::{IndexOperation, IndexSettings};

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;

/// Abstracts the underlying search service (Algolia, OpenSearch, etc.).
///
/// Implementations are injected into the pipeline so that tests can replace
/// the remote service with a mock. Both calls block until the service has
/// acknowledged the work; neither configures its own timeout or retries.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Push a settings payload to a destination index and wait for it to apply.
    ///
    /// Reapplying identical settings is a no-op from the caller's perspective.
    ///
    /// # Arguments
    ///
    /// * `index_name` - The destination index
    /// * `settings` - The settings object plus forwarding options
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Once the service has acknowledged the settings
    /// * `Err(SearchIndexError)` - If the call or the acknowledgement fails
    async fn set_settings(
        &self,
        index_name: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError>;

    /// Submit an ordered list of index operations as one batch.
    ///
    /// The whole call either succeeds or fails; a rejected operation inside
    /// the batch fails the batch.
    ///
    /// # Arguments
    ///
    /// * `operations` - Upserts and deletes, possibly spanning several indices
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Once every affected index acknowledged the batch
    /// * `Err(SearchIndexError)` - If the batch fails
    async fn batch(
        &self,
        operations: &[IndexOperation],
    ) -> Result<BatchOperationSummary, SearchIndexError>;
}
