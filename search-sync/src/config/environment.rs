//! Environment-driven configuration.

use std::env;
use std::time::Duration;

use search_sync_repository::AlgoliaConfig;
use search_sync_shared::{FieldRules, SettingsConfig};

use crate::IndexingError;

/// Field holding the type discriminator when none is configured.
pub const DEFAULT_TYPE_FIELD: &str = "__typename";

/// How destination indices are named and how per-type configuration is keyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMode {
    /// `{prefix}-{table}` where `table` is the first `-` segment of the
    /// lowercased source table name. Field rules and settings are global.
    Global { prefix: String },
    /// The record's type discriminator names the index, falling back to the
    /// lowercased table name. Field rules and settings may be keyed by type.
    PerType,
}

/// Which search service receives the operations.
#[derive(Debug, Clone)]
pub enum SearchBackend {
    Algolia(AlgoliaConfig),
    OpenSearch { url: String },
}

/// Immutable process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Destination naming mode.
    pub index_mode: IndexMode,
    /// Name of the type-discriminator field in record images.
    pub type_field: String,
    /// Include/exclude rules, if any.
    pub fields: Option<FieldRules>,
    /// Index settings pushed before each batch, if any.
    pub settings: Option<SettingsConfig>,
    /// Whether debug-level logging was requested.
    pub debug: bool,
    /// Whether logs are emitted as JSON.
    pub json_logs: bool,
    /// The search service to talk to.
    pub backend: SearchBackend,
}

impl Config {
    /// Load the configuration from process environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_BACKEND`: "algolia" or "opensearch" (default: algolia)
    /// - `ALGOLIA_APP_ID`, `ALGOLIA_API_KEY`: Algolia credentials (required for algolia)
    /// - `ALGOLIA_HOST`: Algolia API host override
    /// - `TASK_POLL_INTERVAL_MS`: Algolia task polling interval (default: 100)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (required for opensearch)
    /// - `INDEX_MODE`: "global" or "per-type" (default: global)
    /// - `ALGOLIA_PROJECT_ID`: index name prefix (required in global mode)
    /// - `TYPE_FIELD`: type discriminator field (default: __typename)
    /// - `ALGOLIA_FIELDS`: JSON include/exclude field rules
    /// - `ALGOLIA_SETTINGS`: JSON index settings
    /// - `DEBUG`: "1" or "true" for debug logging
    /// - `LOG_FORMAT`: "json" for JSON logs
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - The validated configuration
    /// * `Err(IndexingError::ConfigError)` - If anything is missing, malformed or contradictory
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let index_mode = match var("INDEX_MODE")
            .unwrap_or_else(|| "global".to_string())
            .to_lowercase()
            .as_str()
        {
            "global" => {
                let prefix = var("ALGOLIA_PROJECT_ID").ok_or_else(|| {
                    IndexingError::config(
                        "You need to provide ALGOLIA_PROJECT_ID in order to guarantee uniqueness",
                    )
                })?;
                IndexMode::Global { prefix }
            }
            "per-type" | "per_type" | "pertype" => IndexMode::PerType,
            other => {
                return Err(IndexingError::config(format!(
                    "Invalid INDEX_MODE '{}', expected 'global' or 'per-type'",
                    other
                )))
            }
        };

        let fields = match var("ALGOLIA_FIELDS") {
            Some(raw) => FieldRules::parse(&raw).map_err(|e| {
                IndexingError::config(format!(
                    "If you specify fields, it must be an object with EITHER field: \"include\" OR \"exclude\": {}",
                    e
                ))
            })?,
            None => None,
        };

        let settings = match var("ALGOLIA_SETTINGS") {
            Some(raw) => SettingsConfig::parse(&raw).map_err(|e| {
                IndexingError::config(format!(
                    "If you specify settings, it must at least have an object of settings: {}",
                    e
                ))
            })?,
            None => None,
        };

        if let IndexMode::Global { .. } = index_mode {
            if fields.as_ref().is_some_and(FieldRules::is_per_type) {
                return Err(IndexingError::config(
                    "Per-type field rules require INDEX_MODE=per-type",
                ));
            }
            if settings.as_ref().is_some_and(SettingsConfig::is_per_type) {
                return Err(IndexingError::config(
                    "Per-type index settings require INDEX_MODE=per-type",
                ));
            }
        }

        let backend = match var("SEARCH_BACKEND")
            .unwrap_or_else(|| "algolia".to_string())
            .to_lowercase()
            .as_str()
        {
            "algolia" => {
                let (app_id, api_key) = match (var("ALGOLIA_APP_ID"), var("ALGOLIA_API_KEY")) {
                    (Some(app_id), Some(api_key)) => (app_id, api_key),
                    _ => {
                        return Err(IndexingError::config(
                            "You need to provide ALGOLIA_APP_ID and ALGOLIA_API_KEY env variables",
                        ))
                    }
                };
                let mut algolia = AlgoliaConfig::new(app_id, api_key);
                if let Some(host) = var("ALGOLIA_HOST") {
                    algolia = algolia.with_host(host);
                }
                if let Some(raw) = var("TASK_POLL_INTERVAL_MS") {
                    let millis = raw.trim().parse::<u64>().map_err(|e| {
                        IndexingError::config(format!("Invalid TASK_POLL_INTERVAL_MS: {}", e))
                    })?;
                    algolia = algolia.with_task_poll_interval(Duration::from_millis(millis));
                }
                SearchBackend::Algolia(algolia)
            }
            "opensearch" => {
                let url = var("OPENSEARCH_URL").ok_or_else(|| {
                    IndexingError::config("You need to provide OPENSEARCH_URL for the opensearch backend")
                })?;
                SearchBackend::OpenSearch { url }
            }
            other => {
                return Err(IndexingError::config(format!(
                    "Invalid SEARCH_BACKEND '{}', expected 'algolia' or 'opensearch'",
                    other
                )))
            }
        };

        let debug = var("DEBUG")
            .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let json_logs = var("LOG_FORMAT")
            .map(|value| value.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            index_mode,
            type_field: var("TYPE_FIELD").unwrap_or_else(|| DEFAULT_TYPE_FIELD.to_string()),
            fields,
            settings,
            debug,
            json_logs,
            backend,
        })
    }

    /// Whether records are discriminated by type.
    pub fn uses_type_discriminator(&self) -> bool {
        matches!(self.index_mode, IndexMode::PerType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, IndexingError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const ALGOLIA: [(&str, &str); 3] = [
        ("ALGOLIA_APP_ID", "APP123"),
        ("ALGOLIA_API_KEY", "secret"),
        ("ALGOLIA_PROJECT_ID", "shop"),
    ];

    fn with_algolia(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut vars = ALGOLIA.to_vec();
        vars.extend_from_slice(extra);
        vars
    }

    #[test]
    fn test_minimal_global_config() {
        let config = load(&ALGOLIA).unwrap();

        assert_eq!(
            config.index_mode,
            IndexMode::Global {
                prefix: "shop".to_string()
            }
        );
        assert_eq!(config.type_field, DEFAULT_TYPE_FIELD);
        assert!(config.fields.is_none());
        assert!(config.settings.is_none());
        assert!(!config.debug);
        assert!(!config.json_logs);
        assert!(!config.uses_type_discriminator());
        assert!(matches!(config.backend, SearchBackend::Algolia(_)));
    }

    #[test]
    fn test_missing_credentials() {
        let result = load(&[("ALGOLIA_PROJECT_ID", "shop"), ("ALGOLIA_APP_ID", "APP123")]);
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_missing_project_id_in_global_mode() {
        let result = load(&[("ALGOLIA_APP_ID", "APP123"), ("ALGOLIA_API_KEY", "secret")]);
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_per_type_mode_needs_no_project_id() {
        let config = load(&[
            ("ALGOLIA_APP_ID", "APP123"),
            ("ALGOLIA_API_KEY", "secret"),
            ("INDEX_MODE", "per-type"),
            ("TYPE_FIELD", "kind"),
        ])
        .unwrap();

        assert_eq!(config.index_mode, IndexMode::PerType);
        assert_eq!(config.type_field, "kind");
        assert!(config.uses_type_discriminator());
    }

    #[test]
    fn test_include_and_exclude_rejected_at_load() {
        let result = load(&with_algolia(&[(
            "ALGOLIA_FIELDS",
            r#"{"include": ["a"], "exclude": ["b"]}"#,
        )]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_fields_json_rejected() {
        let result = load(&with_algolia(&[("ALGOLIA_FIELDS", "{include")]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_settings_without_settings_object_rejected() {
        let result = load(&with_algolia(&[(
            "ALGOLIA_SETTINGS",
            r#"{"forwardToReplicas": true}"#,
        )]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_per_type_rules_rejected_in_global_mode() {
        let result = load(&with_algolia(&[(
            "ALGOLIA_FIELDS",
            r#"{"Post": {"include": ["title"]}}"#,
        )]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));

        let result = load(&with_algolia(&[(
            "ALGOLIA_SETTINGS",
            r#"{"Post": {"settings": {}}}"#,
        )]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_blank_json_parameters_mean_unset() {
        let config = load(&with_algolia(&[
            ("ALGOLIA_FIELDS", "\"\""),
            ("ALGOLIA_SETTINGS", ""),
        ]))
        .unwrap();

        assert!(config.fields.is_none());
        assert!(config.settings.is_none());
    }

    #[test]
    fn test_opensearch_backend() {
        let config = load(&[
            ("SEARCH_BACKEND", "OpenSearch"),
            ("OPENSEARCH_URL", "http://localhost:9200"),
            ("ALGOLIA_PROJECT_ID", "shop"),
        ])
        .unwrap();

        assert!(
            matches!(config.backend, SearchBackend::OpenSearch { ref url } if url == "http://localhost:9200")
        );

        let result = load(&[("SEARCH_BACKEND", "opensearch"), ("ALGOLIA_PROJECT_ID", "shop")]);
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_modes_rejected() {
        let result = load(&with_algolia(&[("INDEX_MODE", "sharded")]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));

        let result = load(&with_algolia(&[("SEARCH_BACKEND", "solr")]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));

        let result = load(&with_algolia(&[("TASK_POLL_INTERVAL_MS", "soon")]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_logging_flags() {
        let config = load(&with_algolia(&[("DEBUG", "1"), ("LOG_FORMAT", "JSON")])).unwrap();
        assert!(config.debug);
        assert!(config.json_logs);

        let config = load(&with_algolia(&[("DEBUG", "0")])).unwrap();
        assert!(!config.debug);
    }
}
