//! # Search Sync Repository
//!
//! This crate provides the trait and implementations for talking to the
//! remote search service. It includes definitions for errors, the provider
//! interface, and concrete implementations for Algolia and OpenSearch.

pub mod algolia;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use algolia::{AlgoliaConfig, AlgoliaProvider};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchProvider;
pub use types::BatchOperationSummary;
