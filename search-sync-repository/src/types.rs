//! Response types for search index operations.

use search_sync_shared::IndexOperation;

/// Summary of an acknowledged batch submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOperationSummary {
    /// Total number of operations in the batch.
    pub total: usize,
    /// Number of upserts.
    pub upserts: usize,
    /// Number of deletes.
    pub deletes: usize,
    /// Destination indices touched, in order of first appearance.
    pub indices: Vec<String>,
}

impl BatchOperationSummary {
    /// Summarize a list of operations.
    pub fn from_operations(operations: &[IndexOperation]) -> Self {
        let mut summary = Self {
            total: operations.len(),
            ..Self::default()
        };

        for op in operations {
            if op.is_delete() {
                summary.deletes += 1;
            } else {
                summary.upserts += 1;
            }
            if !summary.indices.iter().any(|name| name == op.index_name()) {
                summary.indices.push(op.index_name().to_string());
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_sync_shared::DocumentFields;

    fn op(index_name: &str, delete: bool) -> IndexOperation {
        let index_name = index_name.to_string();
        let document = DocumentFields::new();
        if delete {
            IndexOperation::Delete {
                index_name,
                document,
            }
        } else {
            IndexOperation::Upsert {
                index_name,
                document,
            }
        }
    }

    #[test]
    fn test_from_operations() {
        let summary = BatchOperationSummary::from_operations(&[
            op("app-orders", false),
            op("app-users", true),
            op("app-orders", false),
        ]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.upserts, 2);
        assert_eq!(summary.deletes, 1);
        assert_eq!(summary.indices, vec!["app-orders", "app-users"]);
    }

    #[test]
    fn test_from_no_operations() {
        assert_eq!(
            BatchOperationSummary::from_operations(&[]),
            BatchOperationSummary::default()
        );
    }
}
