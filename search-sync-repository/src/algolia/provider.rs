//! Algolia provider implementation.
//!
//! Settings and batches are asynchronous on the Algolia side: each call
//! returns a task id, and the provider polls the task until it is published
//! before returning.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use search_sync_shared::{IndexOperation, IndexSettings};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::algolia::config::AlgoliaConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::BatchOperationSummary;

const APPLICATION_ID_HEADER: &str = "x-algolia-application-id";
const API_KEY_HEADER: &str = "x-algolia-api-key";

#[derive(Debug, Deserialize)]
struct SettingsResponse {
    #[serde(rename = "taskID")]
    task_id: u64,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(rename = "taskID")]
    task_ids: BTreeMap<String, u64>,
}

#[derive(Debug, Deserialize)]
struct TaskStatus {
    status: String,
}

/// Algolia provider implementation.
///
/// # Example
///
/// ```ignore
/// use search_sync_repository::{AlgoliaConfig, AlgoliaProvider, SearchIndexProvider};
///
/// let provider = AlgoliaProvider::new(AlgoliaConfig::new("APP_ID", "API_KEY"))?;
/// provider.batch(&operations).await?;
/// ```
pub struct AlgoliaProvider {
    client: ReqwestClient,
    base_url: Url,
    task_poll_interval: Duration,
}

impl AlgoliaProvider {
    /// Create a new Algolia provider.
    ///
    /// # Returns
    ///
    /// * `Ok(AlgoliaProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If credentials are missing or the host is invalid
    pub fn new(config: AlgoliaConfig) -> Result<Self, SearchIndexError> {
        if config.app_id.is_empty() || config.api_key.is_empty() {
            return Err(SearchIndexError::validation(
                "Algolia app id and API key are required",
            ));
        }

        let base_url = Url::parse(&config.base_url())
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SearchIndexError::connection(format!(
                "'{}' cannot be used as an API host",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        let app_id = HeaderValue::from_str(&config.app_id)
            .map_err(|e| SearchIndexError::validation(format!("Invalid app id: {}", e)))?;
        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| SearchIndexError::validation(format!("Invalid API key: {}", e)))?;
        api_key.set_sensitive(true);
        headers.insert(APPLICATION_ID_HEADER, app_id);
        headers.insert(API_KEY_HEADER, api_key);

        let client = ReqwestClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        info!(
            app_id = %config.app_id,
            host = %base_url,
            "Created Algolia provider"
        );

        Ok(Self {
            client,
            base_url,
            task_poll_interval: config.task_poll_interval,
        })
    }

    /// Build an API URL from path segments, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Turn scalar forwarding options into query parameters.
    ///
    /// Nested options cannot be expressed as query parameters and are skipped.
    fn forwarding_query(options: &Map<String, Value>) -> Vec<(String, String)> {
        options
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Bool(flag) => Some((key.clone(), flag.to_string())),
                Value::Number(number) => Some((key.clone(), number.to_string())),
                Value::String(text) => Some((key.clone(), text.clone())),
                _ => {
                    warn!(option = %key, "Skipping non-scalar settings option");
                    None
                }
            })
            .collect()
    }

    /// Build the multi-index batch request body.
    fn batch_body(operations: &[IndexOperation]) -> Value {
        let requests: Vec<Value> = operations
            .iter()
            .map(|op| {
                let action = if op.is_delete() {
                    "deleteObject"
                } else {
                    "updateObject"
                };
                json!({
                    "action": action,
                    "indexName": op.index_name(),
                    "body": op.document(),
                })
            })
            .collect();

        json!({ "requests": requests })
    }

    /// Check the response status and decode the JSON body.
    async fn read_json<T: DeserializeOwned>(
        response: Response,
        on_error: fn(String) -> SearchIndexError,
    ) -> Result<T, SearchIndexError> {
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Algolia request failed");
            return Err(on_error(format!(
                "Request failed with status {}: {}",
                status, error_body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))
    }

    /// Poll a task until Algolia reports it as published.
    async fn wait_for_task(&self, index_name: &str, task_id: u64) -> Result<(), SearchIndexError> {
        let task_id_segment = task_id.to_string();
        let url = self.endpoint(&["1", "indexes", index_name, "task", &task_id_segment]);

        loop {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| SearchIndexError::task(e.to_string()))?;
            let task: TaskStatus = Self::read_json(response, SearchIndexError::TaskError).await?;

            if task.status == "published" {
                debug!(index = %index_name, task_id = task_id, "Task published");
                return Ok(());
            }
            sleep(self.task_poll_interval).await;
        }
    }
}

#[async_trait]
impl SearchIndexProvider for AlgoliaProvider {
    async fn set_settings(
        &self,
        index_name: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError> {
        let url = self.endpoint(&["1", "indexes", index_name, "settings"]);
        let query = Self::forwarding_query(&settings.options);

        let response = self
            .client
            .put(url)
            .query(&query)
            .json(&settings.settings)
            .send()
            .await
            .map_err(|e| SearchIndexError::settings(e.to_string()))?;
        let receipt: SettingsResponse =
            Self::read_json(response, SearchIndexError::SettingsError).await?;

        debug!(index = %index_name, task_id = receipt.task_id, "Settings submitted");
        self.wait_for_task(index_name, receipt.task_id).await
    }

    async fn batch(
        &self,
        operations: &[IndexOperation],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let summary = BatchOperationSummary::from_operations(operations);
        if operations.is_empty() {
            return Ok(summary);
        }

        let url = self.endpoint(&["1", "indexes", "*", "batch"]);
        let response = self
            .client
            .post(url)
            .json(&Self::batch_body(operations))
            .send()
            .await
            .map_err(|e| SearchIndexError::batch(e.to_string()))?;
        let receipt: BatchResponse = Self::read_json(response, SearchIndexError::BatchError).await?;

        for (index_name, task_id) in &receipt.task_ids {
            self.wait_for_task(index_name, *task_id).await?;
        }

        debug!(
            total = summary.total,
            indices = ?summary.indices,
            "Batch acknowledged"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_sync_shared::{DocumentFields, OBJECT_ID_FIELD};

    fn provider() -> AlgoliaProvider {
        AlgoliaProvider::new(AlgoliaConfig::new("APP123", "secret").with_host("http://localhost:8080"))
            .unwrap()
    }

    #[test]
    fn test_new_requires_credentials() {
        let result = AlgoliaProvider::new(AlgoliaConfig::new("", "secret"));
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));

        let result = AlgoliaProvider::new(AlgoliaConfig::new("APP123", ""));
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
    }

    #[test]
    fn test_new_rejects_invalid_host() {
        let result =
            AlgoliaProvider::new(AlgoliaConfig::new("APP123", "secret").with_host("not a url"));
        assert!(matches!(result, Err(SearchIndexError::ConnectionError(_))));
    }

    #[test]
    fn test_endpoint() {
        let provider = provider();

        assert_eq!(
            provider
                .endpoint(&["1", "indexes", "app-orders", "settings"])
                .as_str(),
            "http://localhost:8080/1/indexes/app-orders/settings"
        );
        assert_eq!(
            provider.endpoint(&["1", "indexes", "*", "batch"]).as_str(),
            "http://localhost:8080/1/indexes/*/batch"
        );
        assert_eq!(
            provider
                .endpoint(&["1", "indexes", "odd name/x", "task", "7"])
                .as_str(),
            "http://localhost:8080/1/indexes/odd%20name%2Fx/task/7"
        );
    }

    #[test]
    fn test_forwarding_query() {
        let mut options = Map::new();
        options.insert("forwardToReplicas".to_string(), json!(true));
        options.insert("replaceExistingSynonyms".to_string(), json!(false));
        options.insert("batchSize".to_string(), json!(50));
        options.insert("requestOptions".to_string(), json!({"headers": {}}));

        let query = AlgoliaProvider::forwarding_query(&options);

        assert_eq!(
            query,
            vec![
                ("forwardToReplicas".to_string(), "true".to_string()),
                ("replaceExistingSynonyms".to_string(), "false".to_string()),
                ("batchSize".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_batch_body() {
        let mut upsert_doc = DocumentFields::new();
        upsert_doc.insert("title".to_string(), json!("Hello"));
        upsert_doc.insert(OBJECT_ID_FIELD.to_string(), json!("A:1"));
        let mut delete_doc = DocumentFields::new();
        delete_doc.insert(OBJECT_ID_FIELD.to_string(), json!("B:2"));

        let body = AlgoliaProvider::batch_body(&[
            IndexOperation::Upsert {
                index_name: "app-posts".to_string(),
                document: upsert_doc,
            },
            IndexOperation::Delete {
                index_name: "app-posts".to_string(),
                document: delete_doc,
            },
        ]);

        assert_eq!(
            body,
            json!({
                "requests": [
                    {"action": "updateObject", "indexName": "app-posts",
                     "body": {"title": "Hello", "objectID": "A:1"}},
                    {"action": "deleteObject", "indexName": "app-posts",
                     "body": {"objectID": "B:2"}}
                ]
            })
        );
    }

    #[test]
    fn test_batch_response_shape() {
        let receipt: BatchResponse = serde_json::from_value(json!({
            "taskID": {"app-posts": 12, "app-users": 13},
            "objectIDs": ["A:1", "B:2"]
        }))
        .unwrap();

        assert_eq!(receipt.task_ids.get("app-posts"), Some(&12));
        assert_eq!(receipt.task_ids.get("app-users"), Some(&13));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        // Nothing listens on this host; an attempted request would fail.
        let provider = provider();
        let summary = provider.batch(&[]).await.unwrap();
        assert_eq!(summary, BatchOperationSummary::default());
    }
}
