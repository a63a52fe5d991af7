//! Session acquisition
//!
//! Resource managers receive a [`Session`] on every call. Where it comes from
//! is up to the [`SessionSource`] the dispatcher was built with.

use async_trait::async_trait;
use std::fmt;

/// Environment variables checked for a bearer token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["RESCALL_TOKEN", "OS_AUTH_TOKEN"];

/// Credentials for one remote call
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Session without credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

// Security: never print the token itself
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Yields an authenticated session for a call
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn session(&self) -> Session;
}

/// Hands out the same token every time
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    session: Session,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            session: Session::with_token(token),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build from an optional token, falling back to anonymous
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Self::new(token.trim()),
            Some(_) => {
                tracing::warn!("Ignoring empty API token");
                Self::anonymous()
            }
            None => Self::anonymous(),
        }
    }
}

#[async_trait]
impl SessionSource for StaticSession {
    async fn session(&self) -> Session {
        self.session.clone()
    }
}

/// Read a bearer token from the environment
pub fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|token| !token.trim().is_empty())
}
