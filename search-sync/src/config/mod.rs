//! Configuration and dependency initialization for the search sync.
//!
//! Configuration is read once at process start and shared immutably by every
//! invocation handled during the process lifetime.

mod dependencies;
mod environment;

pub use dependencies::Dependencies;
pub use environment::{Config, IndexMode, SearchBackend, DEFAULT_TYPE_FIELD};
