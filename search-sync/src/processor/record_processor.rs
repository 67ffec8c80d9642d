//! Record processor implementation.
//!
//! Turns classified records into index operations.

use serde_json::Value;
use tracing::{debug, instrument};

use super::field_projector::project_fields;
use super::object_id::generate_object_id;
use crate::consumer::{ClassifiedRecord, OperationKind};
use search_sync_shared::{DocumentFields, FieldRules, IndexOperation, OBJECT_ID_FIELD};

/// A record turned into an index operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub kind: OperationKind,
    /// Type discriminator the record was classified with.
    pub type_name: Option<String>,
    pub operation: IndexOperation,
}

/// Processor that projects fields and assigns object identities.
#[derive(Debug, Clone, Default)]
pub struct RecordProcessor {
    fields: Option<FieldRules>,
    /// Type discriminator field kept after projection, when types are in use.
    type_field: Option<String>,
}

impl RecordProcessor {
    /// Create a new record processor.
    pub fn new(fields: Option<FieldRules>, type_field: Option<String>) -> Self {
        Self { fields, type_field }
    }

    /// Process a single classified record.
    ///
    /// Deletes carry only the `objectID`. Every other kind becomes an upsert of
    /// the projected image plus `objectID`.
    #[instrument(skip(self, record), fields(index = %record.index_name, kind = ?record.kind))]
    pub fn process(&self, record: ClassifiedRecord) -> ProcessedRecord {
        let ClassifiedRecord {
            kind,
            index_name,
            type_name,
            keys,
            image,
            ..
        } = record;
        let object_id = generate_object_id(&keys);

        let operation = match kind {
            OperationKind::Delete => {
                let mut document = DocumentFields::new();
                document.insert(OBJECT_ID_FIELD.to_string(), Value::String(object_id));
                IndexOperation::Delete {
                    index_name,
                    document,
                }
            }
            OperationKind::Create | OperationKind::Update | OperationKind::Unsupported => {
                let document = self.project(image, type_name.as_deref(), object_id);
                IndexOperation::Upsert {
                    index_name,
                    document,
                }
            }
        };

        debug!(object_id = ?operation.object_id(), "Processed record");

        ProcessedRecord {
            kind,
            type_name,
            operation,
        }
    }

    fn project(
        &self,
        image: DocumentFields,
        type_name: Option<&str>,
        object_id: String,
    ) -> DocumentFields {
        let type_value = self
            .type_field
            .as_ref()
            .and_then(|field| image.get(field).map(|value| (field.clone(), value.clone())));

        let rule = self
            .fields
            .as_ref()
            .and_then(|rules| rules.rule_for(type_name));
        let mut document = project_fields(image, rule);

        if let Some((field, value)) = type_value {
            document.entry(field).or_insert(value);
        }
        document.insert(OBJECT_ID_FIELD.to_string(), Value::String(object_id));
        document
    }
}
