//! Index operations submitted to the search service.

use serde::Serialize;

use crate::types::document::{object_id, DocumentFields};

/// One mutation of a destination index.
///
/// Within a batch, operations keep the order of the change records they were
/// built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum IndexOperation {
    /// Create or fully replace the document with the same `objectID`.
    Upsert {
        index_name: String,
        document: DocumentFields,
    },
    /// Remove the document with the same `objectID`.
    Delete {
        index_name: String,
        document: DocumentFields,
    },
}

impl IndexOperation {
    /// The destination index.
    pub fn index_name(&self) -> &str {
        match self {
            Self::Upsert { index_name, .. } | Self::Delete { index_name, .. } => index_name,
        }
    }

    /// The document body carried by the operation.
    pub fn document(&self) -> &DocumentFields {
        match self {
            Self::Upsert { document, .. } | Self::Delete { document, .. } => document,
        }
    }

    /// The `objectID` of the targeted document.
    pub fn object_id(&self) -> Option<&str> {
        object_id(self.document())
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}
