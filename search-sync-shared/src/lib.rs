//! # Search Sync Shared
//!
//! This crate defines the data structures shared across the change-stream to
//! search-index sync. It includes the tagged attribute values found in stream
//! records, the documents and index operations produced from them, and the
//! field-rule and index-settings configuration that shapes those documents.

pub mod types;

pub use types::attribute_value::{deserialize_image, AttributeMap, AttributeValue};
pub use types::document::{object_id, DocumentFields, OBJECT_ID_FIELD};
pub use types::field_rule::{FieldRule, FieldRules};
pub use types::index_operation::IndexOperation;
pub use types::index_settings::{IndexSettings, SettingsConfig};
