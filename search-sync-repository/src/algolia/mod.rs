//! Algolia implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! that talks to the Algolia REST API over HTTP.

mod config;
mod provider;

pub use config::AlgoliaConfig;
pub use provider::AlgoliaProvider;
