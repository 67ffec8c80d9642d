//! Field projection.

use search_sync_shared::{DocumentFields, FieldRule};

/// Apply a field rule to a deserialized image.
///
/// Without a rule the fields pass through unchanged. An include rule keeps the
/// intersection with the listed names, an exclude rule removes them. Field
/// order of the image is preserved.
pub fn project_fields(mut fields: DocumentFields, rule: Option<&FieldRule>) -> DocumentFields {
    match rule {
        None => fields,
        Some(FieldRule::Include(names)) => {
            fields.retain(|name, _| names.contains(name));
            fields
        }
        Some(FieldRule::Exclude(names)) => {
            fields.retain(|name, _| !names.contains(name));
            fields
        }
    }
}
