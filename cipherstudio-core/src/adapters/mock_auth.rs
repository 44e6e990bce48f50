//! Mock authentication provider
//!
//! Never checks credentials against anything. Identities and tokens are
//! synthesized from the form input and the current time.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::result::Result;
use crate::domain::{Credentials, Identity, Registration, Session};
use crate::ports::AuthProvider;

/// Id given to every identity produced by `login`
pub const MOCK_LOGIN_USER_ID: &str = "user-1";

#[derive(Debug, Default)]
pub struct MockAuthProvider;

impl MockAuthProvider {
    pub fn new() -> Self {
        Self
    }

    fn token() -> String {
        format!("mock-token-{}", Utc::now().timestamp_millis())
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        credentials.validate()?;
        let email = credentials.email.trim();
        let identity = Identity::new(
            MOCK_LOGIN_USER_ID,
            email,
            Identity::username_from_email(email),
        );
        Ok(Session {
            identity,
            token: Self::token(),
        })
    }

    async fn register(&self, registration: &Registration) -> Result<Session> {
        registration.validate()?;
        let identity = Identity::new(
            format!("user-{}", Utc::now().timestamp_millis()),
            registration.email.trim(),
            registration.username.trim(),
        );
        Ok(Session {
            identity,
            token: Self::token(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::Error;

    #[tokio::test]
    async fn test_login_derives_username_from_email() {
        let session = MockAuthProvider::new()
            .login(&Credentials::new("a@b.com", "x"))
            .await
            .unwrap();
        assert_eq!(session.identity.username, "a");
        assert_eq!(session.identity.email, "a@b.com");
        assert_eq!(session.identity.id, MOCK_LOGIN_USER_ID);
        assert!(session.token.starts_with("mock-token-"));
    }

    #[tokio::test]
    async fn test_register_uses_explicit_username() {
        let registration = Registration {
            email: "ada@example.com".to_string(),
            username: "lovelace".to_string(),
            password: "analytical".to_string(),
            confirm_password: "analytical".to_string(),
        };
        let session = MockAuthProvider::new().register(&registration).await.unwrap();
        assert_eq!(session.identity.username, "lovelace");
        assert!(session.identity.id.starts_with("user-"));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let registration = Registration {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
        };
        let err = MockAuthProvider::new().register(&registration).await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }
}
