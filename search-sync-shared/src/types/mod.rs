//! This module defines the core data structures and types used across the sync.
//! It re-exports the tagged attribute values, documents, index operations and
//! the field/settings configuration types.

pub mod attribute_value;
pub mod document;
pub mod field_rule;
pub mod index_operation;
pub mod index_settings;

pub use attribute_value::{AttributeMap, AttributeValue};
pub use document::DocumentFields;
pub use field_rule::{FieldRule, FieldRules};
pub use index_operation::IndexOperation;
pub use index_settings::{IndexSettings, SettingsConfig};

use serde_json::Value;

/// Whether a configuration value means "nothing configured".
///
/// Deployment templates default unset JSON parameters to `""`, so an empty
/// string is treated like `null` and `{}`.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
