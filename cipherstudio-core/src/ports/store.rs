//! Key-value store port - durable storage of serialized blobs

use crate::domain::result::Result;

/// Fixed keys of the persisted state layout
pub mod keys {
    /// Serialized project collection (JSON array)
    pub const PROJECTS: &str = "projects";
    /// Opaque session token
    pub const SESSION_TOKEN: &str = "session-token";
    /// Serialized identity record
    pub const SESSION_IDENTITY: &str = "session-identity";
}

/// Key-value store abstraction
///
/// Values are whole text blobs: a `set` replaces the previous value for the
/// key. Writes are synchronous; all callers share one event loop, so a store
/// has a single writer at a time.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing prior content
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
