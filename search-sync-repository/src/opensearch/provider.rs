//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesPutSettingsParts},
    params::Refresh,
    BulkParts, OpenSearch,
};
use search_sync_shared::{IndexOperation, IndexSettings};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::BatchOperationSummary;

/// Forwarding options understood by the settings call.
const PRESERVE_EXISTING_OPTIONS: [&str; 2] = ["preserveExisting", "preserve_existing"];

/// OpenSearch provider implementation.
///
/// Documents are stored with their `objectID` as the OpenSearch `_id`, so
/// upserts and deletes for the same primary key always target the same
/// document.
///
/// # Example
///
/// ```ignore
/// use search_sync_repository::{OpenSearchProvider, SearchIndexProvider};
///
/// let provider = OpenSearchProvider::new("http://localhost:9200").await?;
/// provider.batch(&operations).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self { client })
    }

    /// Validate an index name against OpenSearch naming rules.
    ///
    /// Names must be non-empty and lowercase, must not start with `-`, `_` or
    /// `+`, and must not contain any of `\ / * ? " < > | , #` or spaces.
    fn validate_index_name(index_name: &str) -> Result<(), SearchIndexError> {
        if index_name.is_empty() {
            return Err(SearchIndexError::validation("Index name cannot be empty"));
        }
        if index_name.starts_with(['-', '_', '+']) {
            return Err(SearchIndexError::validation(format!(
                "Index name '{}' cannot start with '-', '_' or '+'",
                index_name
            )));
        }
        if index_name.chars().any(|c| c.is_uppercase()) {
            return Err(SearchIndexError::validation(format!(
                "Index name '{}' must be lowercase",
                index_name
            )));
        }
        if index_name
            .chars()
            .any(|c| matches!(c, '\\' | '/' | '*' | '?' | '"' | '<' | '>' | '|' | ',' | '#' | ' '))
        {
            return Err(SearchIndexError::validation(format!(
                "Index name '{}' contains invalid characters",
                index_name
            )));
        }
        Ok(())
    }

    /// Map a destination name to the OpenSearch index that stores it.
    ///
    /// OpenSearch index names are lowercase, so type-named destinations such
    /// as `Order` land in `order`.
    fn index_name_for(name: &str) -> Result<String, SearchIndexError> {
        let index_name = name.to_lowercase();
        Self::validate_index_name(&index_name)?;
        Ok(index_name)
    }

    /// Read the `preserve_existing` flag from the forwarding options.
    ///
    /// Options the settings API does not understand are ignored.
    fn preserve_existing(settings: &IndexSettings) -> bool {
        for (key, value) in &settings.options {
            if PRESERVE_EXISTING_OPTIONS.contains(&key.as_str()) {
                return value.as_bool().unwrap_or(false);
            }
            debug!(option = %key, "Ignoring settings option not supported by OpenSearch");
        }
        false
    }

    /// Build the newline-delimited bulk body for a batch of operations.
    fn bulk_body(operations: &[IndexOperation]) -> Result<Vec<JsonBody<Value>>, SearchIndexError> {
        Ok(Self::bulk_lines(operations)?
            .into_iter()
            .map(JsonBody::from)
            .collect())
    }

    /// Bulk request lines: upserts become `index` actions followed by the
    /// document, deletes become `delete` actions with no body.
    fn bulk_lines(operations: &[IndexOperation]) -> Result<Vec<Value>, SearchIndexError> {
        let mut lines = Vec::with_capacity(operations.len() * 2);

        for op in operations {
            let index_name = Self::index_name_for(op.index_name())?;
            let object_id = op.object_id().ok_or_else(|| {
                SearchIndexError::validation(format!(
                    "Operation for index '{}' has no objectID",
                    op.index_name()
                ))
            })?;
            let meta = json!({ "_index": index_name, "_id": object_id });

            match op {
                IndexOperation::Upsert { document, .. } => {
                    lines.push(json!({ "index": meta }));
                    lines.push(json!(document));
                }
                IndexOperation::Delete { .. } => {
                    lines.push(json!({ "delete": meta }));
                }
            }
        }

        Ok(lines)
    }

    /// Extract the first item error from a bulk response, if any.
    ///
    /// A missing document on delete (404) is not an error.
    fn first_bulk_error(response: &Value) -> Option<String> {
        if !response["errors"].as_bool().unwrap_or(false) {
            return None;
        }

        response["items"].as_array()?.iter().find_map(|item| {
            let (action, result) = item.as_object()?.iter().next()?;
            let status = result["status"].as_u64().unwrap_or(0);
            if action == "delete" && status == 404 {
                return None;
            }
            result.get("error").map(|err| {
                format!(
                    "{} of '{}' in '{}' failed with status {}: {}",
                    action,
                    result["_id"].as_str().unwrap_or_default(),
                    result["_index"].as_str().unwrap_or_default(),
                    status,
                    err
                )
            })
        })
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Push index settings, creating the index with them if it doesn't exist.
    ///
    /// OpenSearch acknowledges settings synchronously; a response with
    /// `acknowledged: false` is reported as an error.
    async fn set_settings(
        &self,
        index_name: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError> {
        let index_name = Self::index_name_for(index_name)?;
        let index_name = index_name.as_str();

        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index_name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::settings(e.to_string()))?;

        let result = if exists.status_code().as_u16() == 404 {
            debug!(index = %index_name, "Creating index with settings");
            self.client
                .indices()
                .create(IndicesCreateParts::Index(index_name))
                .body(json!({ "settings": settings.settings }))
                .send()
                .await
        } else {
            self.client
                .indices()
                .put_settings(IndicesPutSettingsParts::Index(&[index_name]))
                .preserve_existing(Self::preserve_existing(settings))
                .body(json!(settings.settings))
                .send()
                .await
        };
        let response = result.map_err(|e| SearchIndexError::settings(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Settings request failed");
            return Err(SearchIndexError::settings(format!(
                "Settings update failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        if !body["acknowledged"].as_bool().unwrap_or(false) {
            return Err(SearchIndexError::task(format!(
                "Settings for index '{}' were not acknowledged",
                index_name
            )));
        }

        debug!(index = %index_name, "Index settings applied");
        Ok(())
    }

    /// Submit the batch through the bulk API and wait for it to be searchable.
    async fn batch(
        &self,
        operations: &[IndexOperation],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let summary = BatchOperationSummary::from_operations(operations);
        if operations.is_empty() {
            return Ok(summary);
        }

        let body = Self::bulk_body(operations)?;

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .refresh(Refresh::WaitFor)
            .send()
            .await
            .map_err(|e| SearchIndexError::batch(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::batch(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        if let Some(failure) = Self::first_bulk_error(&body) {
            error!(error = %failure, "Bulk request had item failures");
            return Err(SearchIndexError::batch(failure));
        }

        debug!(
            total = summary.total,
            indices = ?summary.indices,
            "Bulk request acknowledged"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_sync_shared::{DocumentFields, OBJECT_ID_FIELD};

    fn document(object_id: &str, extra: &[(&str, Value)]) -> DocumentFields {
        let mut doc = DocumentFields::new();
        for (name, value) in extra {
            doc.insert(name.to_string(), value.clone());
        }
        doc.insert(OBJECT_ID_FIELD.to_string(), json!(object_id));
        doc
    }

    #[test]
    fn test_validate_index_name() {
        assert!(OpenSearchProvider::validate_index_name("app-orders").is_ok());
        assert!(OpenSearchProvider::validate_index_name("post").is_ok());

        for name in ["", "Post", "_hidden", "-dash", "a b", "a/b", "a*", "a,b"] {
            let result = OpenSearchProvider::validate_index_name(name);
            assert!(
                matches!(result, Err(SearchIndexError::ValidationError(_))),
                "Expected ValidationError for '{}'",
                name
            );
        }
    }

    #[test]
    fn test_bulk_body_shape() {
        let operations = vec![
            IndexOperation::Upsert {
                index_name: "app-orders".to_string(),
                document: document("42", &[("total", json!("9.99"))]),
            },
            IndexOperation::Delete {
                index_name: "app-orders".to_string(),
                document: document("43", &[]),
            },
        ];

        let body = OpenSearchProvider::bulk_body(&operations).unwrap();
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_type_named_destinations_are_lowercased() {
        assert_eq!(OpenSearchProvider::index_name_for("Order").unwrap(), "order");
        assert!(OpenSearchProvider::index_name_for("_Order").is_err());

        let operations = vec![
            IndexOperation::Upsert {
                index_name: "Order".to_string(),
                document: document("42", &[]),
            },
            IndexOperation::Delete {
                index_name: "Order".to_string(),
                document: document("43", &[]),
            },
        ];

        let lines = OpenSearchProvider::bulk_lines(&operations).unwrap();
        assert_eq!(lines[0], json!({"index": {"_index": "order", "_id": "42"}}));
        assert_eq!(lines[2], json!({"delete": {"_index": "order", "_id": "43"}}));
        assert!(OpenSearchProvider::bulk_body(&operations).is_ok());
    }

    #[test]
    fn test_bulk_body_requires_object_id() {
        let operations = vec![IndexOperation::Upsert {
            index_name: "app-orders".to_string(),
            document: DocumentFields::new(),
        }];

        let result = OpenSearchProvider::bulk_body(&operations);
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
    }

    #[test]
    fn test_first_bulk_error() {
        let ok = json!({"errors": false, "items": []});
        assert_eq!(OpenSearchProvider::first_bulk_error(&ok), None);

        let missing_delete = json!({
            "errors": true,
            "items": [
                {"delete": {"_index": "app-orders", "_id": "1", "status": 404, "result": "not_found"}}
            ]
        });
        assert_eq!(OpenSearchProvider::first_bulk_error(&missing_delete), None);

        let failed = json!({
            "errors": true,
            "items": [
                {"index": {"_index": "app-orders", "_id": "1", "status": 201}},
                {"index": {"_index": "app-orders", "_id": "2", "status": 400,
                    "error": {"type": "mapper_parsing_exception"}}}
            ]
        });
        let failure = OpenSearchProvider::first_bulk_error(&failed).unwrap();
        assert!(failure.contains("'2'"));
        assert!(failure.contains("mapper_parsing_exception"));
    }

    #[test]
    fn test_preserve_existing() {
        let mut settings = IndexSettings::new(serde_json::Map::new());
        assert!(!OpenSearchProvider::preserve_existing(&settings));

        settings
            .options
            .insert("forwardToReplicas".to_string(), json!(true));
        assert!(!OpenSearchProvider::preserve_existing(&settings));

        settings
            .options
            .insert("preserveExisting".to_string(), json!(true));
        assert!(OpenSearchProvider::preserve_existing(&settings));
    }
}
