//! Index settings application.

use tracing::{debug, info, instrument};

use crate::errors::IngestError;
use search_sync_repository::SearchIndexProvider;
use search_sync_shared::IndexSettings;

/// Push index settings to `index_name` and wait until they are applied.
///
/// Nothing is sent when no settings are configured.
#[instrument(skip(provider, settings))]
pub async fn apply_index_settings(
    provider: &dyn SearchIndexProvider,
    index_name: &str,
    settings: Option<&IndexSettings>,
) -> Result<(), IngestError> {
    let Some(settings) = settings else {
        debug!("No index settings configured");
        return Ok(());
    };

    provider.set_settings(index_name, settings).await?;
    info!(
        settings = settings.settings.len(),
        options = settings.options.len(),
        "Index settings applied"
    );
    Ok(())
}
