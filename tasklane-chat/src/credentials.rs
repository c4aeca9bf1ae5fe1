//! Bearer credential lookup.
//!
//! The client asks a [`CredentialSource`] for a token before every request.
//! `None` means the user is not signed in, and the request is never sent.

use async_trait::async_trait;

/// Environment variable read by [`EnvCredential::default`].
pub const DEFAULT_API_KEY_VAR: &str = "TASKLANE_API_KEY";

/// Supplies the bearer token for gateway requests.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Return the current token, or `None` if none is available.
    async fn bearer_token(&self) -> Option<String>;
}

/// A fixed token. Blank tokens count as missing.
pub struct StaticCredential {
    token: Option<String>,
}

impl StaticCredential {
    /// Use `token` for every request.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }

    /// A source that never has a token.
    pub fn none() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl CredentialSource for StaticCredential {
    async fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Reads the token from a process environment variable on every request.
pub struct EnvCredential {
    var_name: String,
}

impl EnvCredential {
    /// Read the token from `var_name`.
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }

    /// The variable this source reads.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_VAR)
    }
}

#[async_trait]
impl CredentialSource for EnvCredential {
    async fn bearer_token(&self) -> Option<String> {
        match std::env::var(&self.var_name) {
            Ok(token) if !token.trim().is_empty() => Some(token),
            _ => {
                tracing::debug!(var = %self.var_name, "no credential in environment");
                None
            }
        }
    }
}
