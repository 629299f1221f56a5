//! Adapters for external systems: SQLite persistence and the HTTP API.

pub mod http;
pub mod sqlite;
