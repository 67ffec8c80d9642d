//! Processor module for the search sync.
//!
//! Projects record fields and derives object identities.

mod field_projector;
mod object_id;
mod record_processor;

pub use field_projector::project_fields;
pub use object_id::{generate_object_id, OBJECT_ID_SEPARATOR};
pub use record_processor::{ProcessedRecord, RecordProcessor};
