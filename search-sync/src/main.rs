//! Search Sync Main Entry Point
//!
//! Reads one invocation payload (a JSON stream event) per line on stdin and
//! indexes its change records into the configured search service.

use dotenv::dotenv;
use search_sync::{Config, Dependencies, IndexingError};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing(debug: bool, json: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "search_sync={level},search_sync_repository={level}",
            level = default_level
        ))
    });

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "search-sync",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "search-sync",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env();
    let (debug, json) = config
        .as_ref()
        .map(|config| (config.debug, config.json_logs))
        .unwrap_or((false, false));
    init_tracing(debug, json);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e);
        }
    };

    info!("Starting search sync");

    let deps = match Dependencies::new(config).await {
        Ok(deps) => {
            info!(index_mode = ?deps.config.index_mode, "Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str(line) {
            Ok(event) => {
                deps.orchestrator.handle(event).await;
            }
            Err(e) => warn!(error = %e, "Ignoring invocation payload that is not JSON"),
        }
    }

    info!("Input closed, search sync exiting");
    Ok(())
}
