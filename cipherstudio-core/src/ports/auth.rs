//! Authentication provider port
//!
//! Login and registration are asynchronous so a real backend can replace the
//! mock without changing callers.

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{Credentials, Registration, Session};

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Provider name (e.g., "mock")
    fn name(&self) -> &str;

    /// Exchange credentials for a session
    ///
    /// Failures are `Error::Auth` carrying the message shown to the user.
    async fn login(&self, credentials: &Credentials) -> Result<Session>;

    /// Create an account and return its session
    async fn register(&self, registration: &Registration) -> Result<Session>;
}
