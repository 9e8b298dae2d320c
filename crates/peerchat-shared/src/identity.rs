//! The active session identity.
//!
//! An [`Identity`] is created once registration with the services succeeds
//! and never changes afterwards; signing out drops it.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    username: String,
    directory_url: String,
    messaging_url: String,
    port: u16,
}

impl Identity {
    pub fn new(
        username: impl Into<String>,
        directory_url: impl Into<String>,
        messaging_url: impl Into<String>,
        port: u16,
    ) -> Result<Self, IdentityError> {
        let username = username.into().trim().to_string();
        if username.is_empty() {
            return Err(IdentityError::EmptyUsername);
        }
        if port == 0 {
            return Err(IdentityError::InvalidPort);
        }
        let directory_url = directory_url.into();
        let messaging_url = messaging_url.into();
        if directory_url.is_empty() || messaging_url.is_empty() {
            return Err(IdentityError::EmptyUrl);
        }

        Ok(Self {
            username,
            directory_url,
            messaging_url,
            port,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn directory_url(&self) -> &str {
        &self.directory_url
    }

    pub fn messaging_url(&self) -> &str {
        &self.messaging_url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether `sender` is this identity.
    pub fn is_self(&self, sender: &str) -> bool {
        self.username == sender
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_trims_username() {
        let id = Identity::new(" alice ", "http://d", "http://m", 9000).unwrap();
        assert_eq!(id.username(), "alice");
        assert!(id.is_self("alice"));
        assert!(!id.is_self("bob"));
    }

    #[test]
    fn test_identity_rejects_empty_username() {
        assert_eq!(
            Identity::new("  ", "http://d", "http://m", 9000),
            Err(IdentityError::EmptyUsername)
        );
    }

    #[test]
    fn test_identity_rejects_port_zero() {
        assert_eq!(
            Identity::new("alice", "http://d", "http://m", 0),
            Err(IdentityError::InvalidPort)
        );
    }
}
