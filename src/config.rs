//! Backend origin configuration
//!
//! The extraction service origin is resolved exactly once at start-up and then
//! handed to the [`Gateway`](crate::client::Gateway). Nothing else in the crate
//! reads the environment.

use eyre::{Context, Result, eyre};
use url::Url;

/// Environment variable holding the extraction service origin
pub const API_BASE_URL_VAR: &str = "QDI_API_BASE_URL";

/// Resolved backend configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    origin: Url,
}

impl BackendConfig {
    /// Build a configuration from an already parsed origin.
    ///
    /// # Errors
    /// Returns an error if the origin is not an `http` or `https` URL.
    pub fn new(origin: Url) -> Result<Self> {
        match origin.scheme() {
            "http" | "https" => {}
            other => eyre::bail!("Unsupported scheme '{}' for backend origin {}", other, origin),
        }
        if origin.cannot_be_a_base() {
            eyre::bail!("Backend origin {} cannot be used as a base URL", origin);
        }
        Ok(Self { origin })
    }

    /// Parse an origin string, e.g. `http://localhost:8000`.
    pub fn parse(origin: &str) -> Result<Self> {
        let url = Url::parse(origin.trim())
            .with_context(|| format!("Invalid {}: {}", API_BASE_URL_VAR, origin))?;
        Self::new(url)
    }

    /// Resolve from the process environment.
    ///
    /// Expected environment variables:
    /// - QDI_API_BASE_URL: extraction service origin (required)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary key lookup.
    ///
    /// An explicit `override_url` (e.g. from `--api-url`) should be applied by
    /// the caller via [`BackendConfig::parse`] instead.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = lookup(API_BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| eyre!("{} environment variable not set", API_BASE_URL_VAR))?;
        Self::parse(&value)
    }

    /// The configured origin
    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

impl std::fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.origin)
    }
}
