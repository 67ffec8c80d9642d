//! Wire model for invocation payloads.
//!
//! Defines the change-record structures delivered by DynamoDB Streams and by
//! Kinesis replays of those streams. Unknown fields are ignored; attribute
//! maps are parsed into typed values up front, so a malformed type tag fails
//! the whole payload.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use crate::errors::IngestError;
use search_sync_shared::AttributeMap;

/// Event source of native DynamoDB stream records.
pub const DYNAMODB_SOURCE: &str = "aws:dynamodb";

/// Event source of Kinesis replay records.
pub const KINESIS_SOURCE: &str = "aws:kinesis";

/// One invocation: an ordered list of change records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<ChangeRecord>,
}

impl InvocationEvent {
    /// Parse an invocation payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, IngestError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// A single change record as delivered to the function.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Origin of the record (`aws:dynamodb` or `aws:kinesis`).
    #[serde(default)]
    pub event_source: Option<String>,
    /// Kind of change (`INSERT`, `MODIFY`, `REMOVE`, ...).
    #[serde(default)]
    pub event_name: String,
    /// Stream ARN, which names the source table for native records.
    #[serde(rename = "eventSourceARN", default)]
    pub event_source_arn: Option<String>,
    /// Stream payload of native records.
    #[serde(default)]
    pub dynamodb: Option<StreamRecord>,
    /// Payload of replayed records.
    #[serde(default)]
    pub kinesis: Option<KinesisPayload>,
}

/// The DynamoDB part of a change record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamRecord {
    #[serde(default)]
    pub keys: Option<AttributeMap>,
    #[serde(default)]
    pub new_image: Option<AttributeMap>,
    #[serde(default)]
    pub sequence_number: Option<String>,
    /// Only present in replayed records.
    #[serde(default)]
    pub source_table: Option<String>,
}

/// Kinesis envelope of a replayed stream record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisPayload {
    /// Base64 encoded JSON of a [`StreamRecord`].
    pub data: String,
    #[serde(default)]
    pub sequence_number: Option<String>,
}

impl KinesisPayload {
    /// Decode the replayed stream record.
    ///
    /// An undecodable payload is a structural error for the whole invocation.
    pub fn decode(&self) -> Result<StreamRecord, IngestError> {
        let bytes = STANDARD.decode(self.data.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
