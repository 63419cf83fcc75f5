//! Collaborator credentials with secure memory.
//!
//! Uses the `secrecy` crate so API keys never leak into logs, debug
//! output, or error messages. Credentials are loaded once at startup and
//! read-only afterwards; a missing key disables the corresponding
//! collaborator instead of failing startup.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret for use in an outgoing request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Snapshot of the two collaborator credentials plus completion tuning.
///
/// Loaded lazily from the environment at startup and passed into the
/// pipeline at construction; recomputing it is idempotent, so no
/// synchronization is needed.
#[derive(Clone)]
pub struct Credentials {
    /// Content-fetch service key (`FIRECRAWL_API_KEY`)
    pub firecrawl_api_key: Option<SecretString>,

    /// Completion endpoint key (`OPENAI_API_KEY`)
    pub completion_api_key: Option<SecretString>,

    /// Completion model (`OPENAI_MODEL`, default gpt-4o-mini)
    pub completion_model: Option<String>,

    /// Completion gateway base URL (`OPENAI_BASE_URL`)
    pub completion_base_url: Option<String>,
}

impl Credentials {
    /// Load from the environment. Absent keys stay `None`; nothing fails.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
        };

        Self {
            firecrawl_api_key: non_empty("FIRECRAWL_API_KEY").map(SecretString::new),
            completion_api_key: non_empty("OPENAI_API_KEY").map(SecretString::new),
            completion_model: non_empty("OPENAI_MODEL"),
            completion_base_url: non_empty("OPENAI_BASE_URL"),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("firecrawl_api_key", &self.firecrawl_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("completion_api_key", &self.completion_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("completion_model", &self.completion_model)
            .field("completion_base_url", &self.completion_base_url)
            .finish()
    }
}
