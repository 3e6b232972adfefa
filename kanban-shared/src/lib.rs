//! # Kanban Shared Library
//!
//! Types and storage shared by the Kanban API server and its clients.
//!
//! ## Module Organization
//!
//! - `models`: Users, tasks and their create/patch payloads
//! - `rules`: Field validation rules used by the server and the client forms
//! - `store`: Record store abstraction with JSON-file and in-memory backends
//! - `wire`: Response bodies shared by server and client

pub mod models;
pub mod rules;
pub mod store;
pub mod wire;

/// Current version of the Kanban shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
