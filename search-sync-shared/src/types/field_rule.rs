//! Field rules deciding which document fields reach the search index.

use std::collections::{BTreeSet, HashMap};

use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;

use crate::types::is_blank;

/// Include or exclude rule for the fields of one document type.
///
/// Parsed from `{"include": [...]}` or `{"exclude": [...]}`. Supplying both
/// keys, or neither, is rejected while the configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawFieldRule")]
pub enum FieldRule {
    /// Keep only the named fields.
    Include(BTreeSet<String>),
    /// Keep every field except the named ones.
    Exclude(BTreeSet<String>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFieldRule {
    // Outer `Some` marks the key as present, even when its value is null.
    #[serde(default, deserialize_with = "present")]
    include: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    exclude: Option<Option<Vec<String>>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<Vec<String>>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Some)
}

impl TryFrom<RawFieldRule> for FieldRule {
    type Error = String;

    fn try_from(raw: RawFieldRule) -> Result<Self, Self::Error> {
        match (raw.include, raw.exclude) {
            (Some(Some(include)), None) => Ok(Self::Include(include.into_iter().collect())),
            (None, Some(Some(exclude))) => Ok(Self::Exclude(exclude.into_iter().collect())),
            (Some(None), None) | (None, Some(None)) => {
                Err("\"include\" and \"exclude\" must be lists of field names".to_string())
            }
            _ => Err(
                "a field rule must be an object with EITHER \"include\" OR \"exclude\"".to_string(),
            ),
        }
    }
}

/// Field rules for the whole deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRules {
    /// One rule applied to every record.
    Global(FieldRule),
    /// Rules keyed by type discriminator. Types without an entry keep all fields.
    PerType(HashMap<String, FieldRule>),
}

impl FieldRules {
    /// Parse field rules from their JSON configuration text.
    ///
    /// An object carrying `include` or `exclude` is a single global rule; any
    /// other object is a map from type name to rule. Empty text, `""`, `null`
    /// and `{}` mean no rules are configured.
    pub fn parse(raw: &str) -> Result<Option<Self>, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Self::from_value(serde_json::from_str(raw)?)
    }

    /// Build field rules from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Option<Self>, serde_json::Error> {
        if is_blank(&value) {
            return Ok(None);
        }
        match &value {
            Value::Object(map) if map.contains_key("include") || map.contains_key("exclude") => {
                Ok(Some(Self::Global(serde_json::from_value(value)?)))
            }
            Value::Object(_) => Ok(Some(Self::PerType(serde_json::from_value(value)?))),
            other => Err(serde_json::Error::custom(format!(
                "field rules must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Look up the rule that applies to a record of the given type.
    pub fn rule_for(&self, type_name: Option<&str>) -> Option<&FieldRule> {
        match self {
            Self::Global(rule) => Some(rule),
            Self::PerType(rules) => type_name.and_then(|name| rules.get(name)),
        }
    }

    /// Whether the rules are keyed by type discriminator.
    pub fn is_per_type(&self) -> bool {
        matches!(self, Self::PerType(_))
    }
}
