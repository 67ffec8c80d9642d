//! Object identity derived from record keys.

use serde_json::Value;

use search_sync_shared::DocumentFields;

/// Separator between key values in an object identity.
pub const OBJECT_ID_SEPARATOR: &str = ":";

/// Build the deterministic `objectID` for a record from its key attributes.
///
/// Key values are joined with `:` in key order. Strings are taken verbatim,
/// any other value by its JSON text. No keys yield an empty identity.
pub fn generate_object_id(keys: &DocumentFields) -> String {
    keys.values()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(OBJECT_ID_SEPARATOR)
}
