//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the KeyValueStore port (durable, per device)
//! - An in-process map for the KeyValueStore port (tests, ephemeral runs)
//! - A mock AuthProvider standing in for a real backend
//! - A JSON bundle writer for the PreviewSandbox port

pub mod bundle;
pub mod duckdb;
pub mod memory;
pub mod mock_auth;
