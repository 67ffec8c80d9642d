//! Document types for the search index.

use serde_json::{Map, Value};

/// Name of the synthesized identity field carried by every indexed document.
pub const OBJECT_ID_FIELD: &str = "objectID";

/// Plain field name to value mapping for one indexed document.
///
/// Field order follows the source image; the search service treats it as an
/// unordered mapping.
pub type DocumentFields = Map<String, Value>;

/// Read the `objectID` of a document, if it has one.
pub fn object_id(document: &DocumentFields) -> Option<&str> {
    document.get(OBJECT_ID_FIELD).and_then(Value::as_str)
}
