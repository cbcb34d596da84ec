//! Session client configuration.
//!
//! Configuration values are provided by the embedding application, not
//! hardcoded in the pipeline.

use crate::state::ReleaseTag;
use std::path::PathBuf;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Session client configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend base URL (e.g. `http://micro.example.com`).
    pub base_url: String,

    /// Fixed per-request timeout. A request past this deadline fails as a
    /// transport error; no partial header state is retained.
    pub timeout: Duration,

    /// Release/routing tag projected into the gateway cookie.
    pub release_tag: ReleaseTag,

    /// Where the durable credential entry lives.
    pub credentials_path: PathBuf,
}

impl SessionConfig {
    /// Create a configuration for the given backend base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            release_tag: ReleaseTag::default(),
            credentials_path: PathBuf::from("front-guess-credentials.json"),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the release/routing tag.
    #[must_use]
    pub const fn with_release_tag(mut self, tag: ReleaseTag) -> Self {
        self.release_tag = tag;
        self
    }

    /// Set the credential file location.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.release_tag, ReleaseTag::Base);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new("http://micro.example.com")
            .with_timeout(Duration::from_secs(3))
            .with_release_tag(ReleaseTag::Gray)
            .with_credentials_path("/tmp/creds.json");
        assert_eq!(config.base_url, "http://micro.example.com");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.release_tag, ReleaseTag::Gray);
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/creds.json"));
    }
}
