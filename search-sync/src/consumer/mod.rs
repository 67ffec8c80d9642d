//! Consumer module for the search sync.
//!
//! Parses invocation payloads and classifies their change records.

mod classifier;
mod messages;

pub use classifier::{
    table_name_from_arn, Classification, ClassifiedRecord, OperationKind, RecordClassifier,
    SkipReason,
};
pub use messages::{
    ChangeRecord, InvocationEvent, KinesisPayload, StreamRecord, DYNAMODB_SOURCE, KINESIS_SOURCE,
};
