//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The core domain
//! depends only on these traits, not on concrete implementations.

mod auth;
mod preview;
mod store;

pub use auth::AuthProvider;
pub use preview::{PreviewResult, PreviewSandbox, SandboxBundle, DEFAULT_TEMPLATE};
pub use store::{keys, KeyValueStore};
