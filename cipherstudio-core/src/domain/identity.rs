//! Identity domain model

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Identity of the signed-in user
///
/// Opaque: never cross-checked against a credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub username: String,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            username: username.into(),
        }
    }

    /// Local part of an email address, used as the login username
    pub fn username_from_email(email: &str) -> &str {
        email.split('@').next().unwrap_or(email)
    }
}

/// Identity plus the opaque token issued with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

/// Login form input
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(Error::auth("Please enter a valid email address"));
        }
        if self.password.is_empty() {
            return Err(Error::auth("Please enter your password"));
        }
        Ok(())
    }
}

/// Registration form input
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(Error::auth("Please enter a valid email address"));
        }
        if self.username.trim().is_empty() {
            return Err(Error::auth("Please choose a username"));
        }
        if self.password != self.confirm_password {
            return Err(Error::auth("Passwords do not match"));
        }
        // Counted in UTF-16 units, the way the web form measures it
        if self.password.encode_utf16().count() < MIN_PASSWORD_LEN {
            return Err(Error::auth(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}
