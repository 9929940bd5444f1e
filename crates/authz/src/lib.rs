//! API key authentication.
//!
//! Every gateway operation is preceded by [`ApiKeyGuard::validate`]. The configured secret
//! is compared in constant time; with no secret configured every key is rejected.

use subtle::ConstantTimeEq;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing API key. Please provide {0} header.")]
    MissingApiKey(String),

    #[error("Invalid API key provided.")]
    InvalidApiKey,
}

/// Holds the expected API key and the header it is read from.
#[derive(Clone)]
pub struct ApiKeyGuard {
    header: String,
    expected: Option<String>,
}

impl std::fmt::Debug for ApiKeyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyGuard")
            .field("header", &self.header)
            .field("configured", &self.expected.is_some())
            .finish()
    }
}

impl ApiKeyGuard {
    pub fn new(header: impl Into<String>, expected: Option<String>) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
            expected,
        }
    }

    /// Lower-cased header name the key is expected in.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Fails with [`AuthError::MissingApiKey`] for an absent or empty key and
    /// [`AuthError::InvalidApiKey`] when it does not match the configured secret.
    pub fn validate(&self, provided: Option<&str>) -> AuthResult<()> {
        let provided = match provided {
            Some(key) if !key.is_empty() => key,
            _ => {
                tracing::warn!(header = %self.header, "request without api key");
                return Err(AuthError::MissingApiKey(self.header.clone()));
            }
        };

        let Some(expected) = self.expected.as_deref() else {
            tracing::warn!("no api key configured; rejecting request");
            return Err(AuthError::InvalidApiKey);
        };

        if constant_time_str_eq(provided, expected) {
            Ok(())
        } else {
            tracing::warn!("request with invalid api key");
            Err(AuthError::InvalidApiKey)
        }
    }
}

/// Standalone form of [`ApiKeyGuard::validate`] for the default `x-api-key` header.
pub fn validate_api_key(provided: Option<&str>, expected: Option<&str>) -> AuthResult<()> {
    ApiKeyGuard::new("x-api-key", expected.map(str::to_string)).validate(provided)
}

fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
