//! Record classifier.
//!
//! Works out where each change record came from, what kind of change it is,
//! which image describes it and which index it belongs to.

use std::fmt;

use serde_json::Value;
use tracing::{debug, error, warn};

use super::messages::{ChangeRecord, StreamRecord, DYNAMODB_SOURCE, KINESIS_SOURCE};
use crate::config::IndexMode;
use crate::errors::IngestError;
use search_sync_shared::{deserialize_image, DocumentFields};

/// Kind of change a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    /// Unrecognized event name, forwarded as an upsert of whichever image
    /// the record carries.
    Unsupported,
}

impl OperationKind {
    /// Map an event name (case-insensitive) to an operation kind.
    pub fn from_event_name(event_name: &str) -> Self {
        match event_name.to_uppercase().as_str() {
            "INSERT" | "AWS:KINESIS:RECORD" => Self::Create,
            "MODIFY" => Self::Update,
            "REMOVE" => Self::Delete,
            _ => Self::Unsupported,
        }
    }

    /// Name of the image the document is built from.
    pub fn image_name(self) -> &'static str {
        match self {
            Self::Delete => "Keys",
            Self::Create | Self::Update | Self::Unsupported => "NewImage",
        }
    }
}

/// Why a record produced no operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The record did not come from a DynamoDB stream or a replay of one.
    UnknownSource(Option<String>),
    /// No table name could be read from the stream ARN.
    UnparseableArn(Option<String>),
    /// A replayed record without `SourceTable`.
    MissingSourceTable,
    /// The record carries no stream payload at all.
    MissingStreamRecord,
    /// The image required by the operation kind is absent.
    MissingImage(&'static str),
    /// The record has no key attributes.
    MissingKeys,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSource(source) => {
                write!(f, "non-DynamoDB event source {:?}", source)
            }
            Self::UnparseableArn(arn) => write!(f, "cannot read table name from ARN {:?}", arn),
            Self::MissingSourceTable => write!(f, "replayed record has no SourceTable"),
            Self::MissingStreamRecord => write!(f, "record has no stream payload"),
            Self::MissingImage(image) => {
                write!(f, "cannot process stream if it does not contain {}", image)
            }
            Self::MissingKeys => write!(f, "record has no Keys"),
        }
    }
}

/// A record ready for projection and assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub kind: OperationKind,
    /// Event name as delivered.
    pub event_name: String,
    /// Destination index.
    pub index_name: String,
    /// Type discriminator, only resolved in per-type mode.
    pub type_name: Option<String>,
    /// Deserialized key attributes, in stream order.
    pub keys: DocumentFields,
    /// Deserialized image the document is built from.
    pub image: DocumentFields,
    pub sequence_number: Option<String>,
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Record(ClassifiedRecord),
    /// No operation. `kind` is known once the event name has been read.
    Skipped {
        reason: SkipReason,
        kind: Option<OperationKind>,
    },
}

/// Classifies change records according to the configured index mode.
#[derive(Debug, Clone)]
pub struct RecordClassifier {
    index_mode: IndexMode,
    type_field: String,
}

impl RecordClassifier {
    /// Create a classifier.
    pub fn new(index_mode: IndexMode, type_field: impl Into<String>) -> Self {
        Self {
            index_mode,
            type_field: type_field.into(),
        }
    }

    /// Classify one change record.
    ///
    /// Per-record data problems yield [`Classification::Skipped`]. Only an
    /// undecodable replay payload is an error.
    pub fn classify(&self, record: ChangeRecord) -> Result<Classification, IngestError> {
        let ChangeRecord {
            event_source,
            event_name,
            event_source_arn,
            dynamodb,
            kinesis,
        } = record;

        let (stream, table, sequence_number, kind) = match event_source.as_deref() {
            Some(DYNAMODB_SOURCE) => {
                let kind = OperationKind::from_event_name(&event_name);
                let table = event_source_arn
                    .as_deref()
                    .and_then(table_name_from_arn)
                    .map(str::to_string);
                let Some(table) = table else {
                    return Ok(skip(SkipReason::UnparseableArn(event_source_arn), Some(kind)));
                };
                let Some(stream) = dynamodb else {
                    return Ok(skip(SkipReason::MissingStreamRecord, Some(kind)));
                };
                let sequence_number = stream.sequence_number.clone();
                (stream, table, sequence_number, kind)
            }
            Some(KINESIS_SOURCE) => {
                // Replays always re-create the document.
                let kind = OperationKind::Create;
                let Some(payload) = kinesis else {
                    return Ok(skip(SkipReason::MissingStreamRecord, Some(kind)));
                };
                let stream = payload.decode()?;
                let Some(table) = stream.source_table.clone() else {
                    return Ok(skip(SkipReason::MissingSourceTable, Some(kind)));
                };
                (stream, table, payload.sequence_number, kind)
            }
            _ => {
                let reason = SkipReason::UnknownSource(event_source.clone());
                error!(reason = %reason, "Ignoring record");
                return Ok(Classification::Skipped { reason, kind: None });
            }
        };

        debug!(
            table = %table,
            event_name = %event_name,
            sequence_number = ?sequence_number,
            "Classifying record"
        );

        if kind == OperationKind::Unsupported {
            warn!(event_name = %event_name, "Unsupported event name");
        }

        let StreamRecord {
            keys, new_image, ..
        } = stream;
        let Some(keys) = keys else {
            return Ok(skip(SkipReason::MissingKeys, Some(kind)));
        };
        let keys = deserialize_image(keys);
        let image = match (kind, new_image) {
            (OperationKind::Delete, _) => keys.clone(),
            (_, Some(image)) => deserialize_image(image),
            (OperationKind::Unsupported, None) => keys.clone(),
            (OperationKind::Create | OperationKind::Update, None) => {
                return Ok(skip(
                    SkipReason::MissingImage(kind.image_name()),
                    Some(kind),
                ))
            }
        };

        let type_name = match self.index_mode {
            IndexMode::PerType => type_discriminator(&image, &self.type_field),
            IndexMode::Global { .. } => None,
        };
        let index_name = self.index_name(&table, type_name.as_deref());

        Ok(Classification::Record(ClassifiedRecord {
            kind,
            event_name,
            index_name,
            type_name,
            keys,
            image,
            sequence_number,
        }))
    }

    /// Destination index for a record of `table` with an optional type.
    pub fn index_name(&self, table: &str, type_name: Option<&str>) -> String {
        let table = table.to_lowercase();
        match &self.index_mode {
            IndexMode::Global { prefix } => {
                let base = table.split('-').next().unwrap_or(&table);
                format!("{}-{}", prefix, base)
            }
            IndexMode::PerType => type_name.map(str::to_string).unwrap_or(table),
        }
    }
}

fn skip(reason: SkipReason, kind: Option<OperationKind>) -> Classification {
    warn!(reason = %reason, kind = ?kind, "Skipping record");
    Classification::Skipped { reason, kind }
}

/// Table name from a stream ARN such as
/// `arn:aws:dynamodb:region:account:table/Name/stream/label`.
pub fn table_name_from_arn(arn: &str) -> Option<&str> {
    let resource = arn.split(':').nth(5)?;
    let mut parts = resource.split('/');
    match (parts.next(), parts.next()) {
        (Some("table"), Some(table)) if !table.is_empty() => Some(table),
        _ => None,
    }
}

fn type_discriminator(image: &DocumentFields, type_field: &str) -> Option<String> {
    match image.get(type_field) {
        Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
        _ => None,
    }
}
