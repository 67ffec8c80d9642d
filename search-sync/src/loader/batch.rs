//! Batch assembly.
//!
//! Collects the operations of one invocation in input order, counts them by
//! kind and resolves which index settings to push before submission.

use tracing::debug;

use crate::consumer::{OperationKind, SkipReason};
use crate::processor::ProcessedRecord;
use search_sync_shared::{IndexOperation, IndexSettings, SettingsConfig};

/// Operation counts for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
    /// Records forwarded despite an unrecognized event name.
    pub unsupported: usize,
    pub skipped: usize,
}

impl BatchStats {
    /// Creates and updates together.
    pub fn modified(&self) -> usize {
        self.inserts + self.updates
    }
}

/// Settings to push before the batch, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsTarget {
    pub index_name: String,
    pub settings: IndexSettings,
}

/// The finished batch of one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledBatch {
    pub operations: Vec<IndexOperation>,
    pub stats: BatchStats,
    pub settings_target: Option<SettingsTarget>,
}

impl AssembledBatch {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Accumulates processed records into one batch.
#[derive(Debug, Default)]
pub struct BatchAssembler {
    operations: Vec<IndexOperation>,
    stats: BatchStats,
    last_index: Option<String>,
    last_type: Option<String>,
}

impl BatchAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the operation of a processed record.
    pub fn push(&mut self, record: ProcessedRecord) {
        match record.kind {
            OperationKind::Create => self.stats.inserts += 1,
            OperationKind::Update => self.stats.updates += 1,
            OperationKind::Delete => self.stats.deletes += 1,
            OperationKind::Unsupported => self.stats.unsupported += 1,
        }
        self.last_index = Some(record.operation.index_name().to_string());
        self.last_type = record.type_name;
        self.operations.push(record.operation);
    }

    /// Count a record that produced no operation.
    ///
    /// Unrecognized event names are counted as unsupported even when skipped.
    pub fn skip(&mut self, reason: &SkipReason, kind: Option<OperationKind>) {
        debug!(reason = %reason, kind = ?kind, "Record skipped");
        if kind == Some(OperationKind::Unsupported) {
            self.stats.unsupported += 1;
        }
        self.stats.skipped += 1;
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Close the batch and resolve its settings target.
    ///
    /// Global settings go to the last destination seen. Per-type settings are
    /// those of the last type seen, pushed to that record's destination.
    pub fn finish(self, settings: Option<&SettingsConfig>) -> AssembledBatch {
        let settings_target = match (settings, self.last_index) {
            (Some(config), Some(index_name)) => config
                .settings_for(self.last_type.as_deref())
                .map(|settings| SettingsTarget {
                    index_name,
                    settings: settings.clone(),
                }),
            _ => None,
        };

        AssembledBatch {
            operations: self.operations,
            stats: self.stats,
            settings_target,
        }
    }
}
