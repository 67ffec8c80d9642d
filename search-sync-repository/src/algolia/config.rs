//! Algolia client configuration.

use std::fmt;
use std::time::Duration;

/// Default interval between task status polls.
pub const DEFAULT_TASK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for the Algolia provider.
#[derive(Clone)]
pub struct AlgoliaConfig {
    /// Algolia application ID.
    pub app_id: String,
    /// API key with write access to the target indices.
    pub api_key: String,
    /// API host override. Defaults to `https://{app_id}.algolia.net`.
    pub host: Option<String>,
    /// How long to wait between task status polls.
    pub task_poll_interval: Duration,
}

impl AlgoliaConfig {
    /// Create a configuration for the given application and key.
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            host: None,
            task_poll_interval: DEFAULT_TASK_POLL_INTERVAL,
        }
    }

    /// Send requests to a different host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Change the task polling interval.
    pub fn with_task_poll_interval(mut self, interval: Duration) -> Self {
        self.task_poll_interval = interval;
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| format!("https://{}.algolia.net", self.app_id))
    }
}

impl fmt::Debug for AlgoliaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgoliaConfig")
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("task_poll_interval", &self.task_poll_interval)
            .finish()
    }
}
