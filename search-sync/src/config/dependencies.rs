//! Dependency initialization and wiring for the search sync.

use std::sync::Arc;
use tracing::info;

use super::{Config, SearchBackend};
use crate::orchestrator::Orchestrator;
use crate::IndexingError;
use search_sync_repository::{AlgoliaProvider, OpenSearchProvider, SearchIndexProvider};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Configuration shared by every invocation.
    pub config: Arc<Config>,
    /// The configured orchestrator ready to handle invocations.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from a loaded configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the search provider cannot be created
    pub async fn new(config: Config) -> Result<Self, IndexingError> {
        info!(
            index_mode = ?config.index_mode,
            type_field = %config.type_field,
            field_rules = config.fields.is_some(),
            index_settings = config.settings.is_some(),
            "Initializing dependencies"
        );

        let config = Arc::new(config);
        let provider = Self::connect(&config.backend).await?;
        let orchestrator = Orchestrator::from_config(Arc::clone(&config), provider);

        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// Create the search provider for the configured backend.
    async fn connect(
        backend: &SearchBackend,
    ) -> Result<Arc<dyn SearchIndexProvider>, IndexingError> {
        match backend {
            SearchBackend::Algolia(algolia) => {
                let provider = AlgoliaProvider::new(algolia.clone()).map_err(|e| {
                    IndexingError::config(format!("Failed to create Algolia provider: {}", e))
                })?;
                info!(app_id = %algolia.app_id, "Algolia provider created");
                Ok(Arc::new(provider))
            }
            SearchBackend::OpenSearch { url } => {
                let provider = OpenSearchProvider::new(url).await.map_err(|e| {
                    IndexingError::config(format!("Failed to create OpenSearch provider: {}", e))
                })?;
                info!(opensearch_url = %url, "OpenSearch provider created");
                Ok(Arc::new(provider))
            }
        }
    }
}
