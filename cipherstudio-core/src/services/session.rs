//! Session service - current identity and its persisted token
//!
//! Authentication itself is delegated to an [`AuthProvider`]. This service
//! owns what happens around it: persisting the session under the fixed
//! keys, restoring it at startup and clearing it on logout.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::{Credentials, Identity, Registration, Session};
use crate::ports::{keys, AuthProvider, KeyValueStore};
use crate::services::logging::{record, LogEvent, LoggingService};

pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    auth: Arc<dyn AuthProvider>,
    logger: Option<Arc<LoggingService>>,
    current: Option<Identity>,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        auth: Arc<dyn AuthProvider>,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        Self {
            store,
            auth,
            logger,
            current: None,
        }
    }

    /// Restore the persisted session, if any
    ///
    /// Both the token and the identity must be present. A malformed identity
    /// clears both entries.
    pub fn restore(&mut self) -> Option<&Identity> {
        self.current = None;

        let token = self.store.get(keys::SESSION_TOKEN).ok().flatten();
        let identity = self.store.get(keys::SESSION_IDENTITY).ok().flatten();
        let (Some(_), Some(raw)) = (token, identity) else {
            return None;
        };

        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => self.current = Some(identity),
            Err(e) => {
                eprintln!("[cipherstudio] Discarding malformed session: {}", e);
                record(
                    self.logger(),
                    LogEvent::new("session_restore_failed")
                        .with_error("malformed session identity")
                        .with_error_details(e.to_string()),
                );
                let _ = self.clear_persisted();
            }
        }
        self.current.as_ref()
    }

    /// Sign in through the auth provider and persist the session
    ///
    /// Validation failures come back as `Error::Auth` with the message to
    /// show next to the form.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Identity> {
        let session = self.auth.login(&Credentials::new(email, password)).await?;
        self.establish(session, "session_login")
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<Identity> {
        let session = self.auth.register(registration).await?;
        self.establish(session, "session_register")
    }

    /// Forget the session in storage and in memory
    pub fn logout(&mut self) -> Result<()> {
        self.clear_persisted()?;
        self.current = None;
        record(self.logger(), LogEvent::new("session_logout"));
        Ok(())
    }

    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn provider_name(&self) -> &str {
        self.auth.name()
    }

    fn establish(&mut self, session: Session, event: &str) -> Result<Identity> {
        let identity_json = serde_json::to_string(&session.identity)?;
        self.store
            .set(keys::SESSION_TOKEN, &session.token)
            .context("Failed to persist session token")?;
        self.store
            .set(keys::SESSION_IDENTITY, &identity_json)
            .context("Failed to persist session identity")?;

        record(self.logger(), LogEvent::new(event));
        self.current = Some(session.identity.clone());
        Ok(session.identity)
    }

    fn clear_persisted(&self) -> Result<()> {
        self.store
            .remove(keys::SESSION_TOKEN)
            .context("Failed to clear session token")?;
        self.store
            .remove(keys::SESSION_IDENTITY)
            .context("Failed to clear session identity")?;
        Ok(())
    }

    fn logger(&self) -> Option<&LoggingService> {
        self.logger.as_deref()
    }
}
