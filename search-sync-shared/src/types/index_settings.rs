//! Index settings pushed to the search service before a batch is submitted.

use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::is_blank;

/// A settings payload for one destination index.
///
/// `settings` is required and holds the index settings object itself. Every
/// other top-level key is a forwarding option (for example
/// `forwardToReplicas`) passed along with the settings call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// The index settings object.
    pub settings: Map<String, Value>,
    /// Options forwarded with the settings call.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl IndexSettings {
    /// Create a settings payload without forwarding options.
    pub fn new(settings: Map<String, Value>) -> Self {
        Self {
            settings,
            options: Map::new(),
        }
    }
}

/// Index settings for the whole deployment.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsConfig {
    /// One payload applied to whichever index the batch targets.
    Global(IndexSettings),
    /// Payloads keyed by type discriminator.
    PerType(HashMap<String, IndexSettings>),
}

impl SettingsConfig {
    /// Parse settings from their JSON configuration text.
    ///
    /// An object carrying `settings` is a single global payload; any other
    /// object is a map from type name to payload, each of which must carry its
    /// own `settings` object. Empty text, `""`, `null` and `{}` mean no
    /// settings are configured.
    pub fn parse(raw: &str) -> Result<Option<Self>, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Self::from_value(serde_json::from_str(raw)?)
    }

    /// Build settings from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Option<Self>, serde_json::Error> {
        if is_blank(&value) {
            return Ok(None);
        }
        match &value {
            Value::Object(map) if map.contains_key("settings") => {
                Ok(Some(Self::Global(serde_json::from_value(value)?)))
            }
            Value::Object(_) => Ok(Some(Self::PerType(serde_json::from_value(value)?))),
            other => Err(serde_json::Error::custom(format!(
                "index settings must be a JSON object with a \"settings\" object, got {}",
                other
            ))),
        }
    }

    /// Look up the payload for a record of the given type.
    pub fn settings_for(&self, type_name: Option<&str>) -> Option<&IndexSettings> {
        match self {
            Self::Global(settings) => Some(settings),
            Self::PerType(settings) => type_name.and_then(|name| settings.get(name)),
        }
    }

    /// Whether the payloads are keyed by type discriminator.
    pub fn is_per_type(&self) -> bool {
        matches!(self, Self::PerType(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_global_with_options() {
        let config = SettingsConfig::parse(
            r#"{"settings": {"searchableAttributes": ["title"]}, "forwardToReplicas": true}"#,
        )
        .unwrap()
        .unwrap();

        let settings = config.settings_for(None).unwrap();
        assert_eq!(
            settings.settings.get("searchableAttributes"),
            Some(&json!(["title"]))
        );
        assert_eq!(settings.options.get("forwardToReplicas"), Some(&json!(true)));
        assert!(!settings.options.contains_key("settings"));
        assert!(!config.is_per_type());
    }

    #[test]
    fn test_parse_per_type() {
        let config = SettingsConfig::parse(
            r#"{"Post": {"settings": {"ranking": ["desc(date)"]}}, "Comment": {"settings": {}}}"#,
        )
        .unwrap()
        .unwrap();

        assert!(config.is_per_type());
        assert!(config.settings_for(Some("Post")).is_some());
        assert!(config.settings_for(Some("Comment")).is_some());
        assert!(config.settings_for(Some("Blog")).is_none());
        assert!(config.settings_for(None).is_none());
    }

    #[test]
    fn test_missing_settings_object_is_rejected() {
        assert!(SettingsConfig::parse(r#"{"forwardToReplicas": true}"#).is_err());
        assert!(SettingsConfig::parse(r#"{"Post": {"forwardToReplicas": true}}"#).is_err());
        assert!(SettingsConfig::parse(r#"{"settings": "not an object"}"#).is_err());
    }

    #[test]
    fn test_parse_blank_values() {
        assert_eq!(SettingsConfig::parse("").unwrap(), None);
        assert_eq!(SettingsConfig::parse("\"\"").unwrap(), None);
        assert_eq!(SettingsConfig::parse("{}").unwrap(), None);
        assert_eq!(SettingsConfig::parse("null").unwrap(), None);
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(SettingsConfig::parse("{settings").is_err());
        assert!(SettingsConfig::parse("42").is_err());
    }
}
