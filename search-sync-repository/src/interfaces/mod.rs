//! Interface definitions for the search index provider.
//!
//! This module defines the abstract `SearchIndexProvider` trait that keeps the
//! pipeline independent of the search backend and lets tests inject mocks.

mod search_index_provider;

pub use search_index_provider::SearchIndexProvider;
