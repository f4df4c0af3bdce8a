//! Importer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::error;
use validator::Validate;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:1234/whoknows";
pub const DEFAULT_USER_AGENT: &str = "DMP 2000";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Effectively "wait until done"; the importer has no timeout policy of its own.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20_000;

/// Connection settings for the MediaWiki / Wikibase API.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ImporterConfig {
    /// Base API endpoint (e.g. `https://wiki.example.org/w/api.php`).
    #[validate(url)]
    pub api_endpoint: String,

    /// Bot or user name for the login handshake.
    pub username: String,

    /// Password for the login handshake.
    pub password: String,

    /// `User-Agent` header sent with every request.
    #[validate(length(min = 1))]
    pub user_agent: String,

    /// Connect and read timeout, in seconds.
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,

    /// Language code used for generated labels and descriptions.
    #[validate(length(min = 1))]
    pub language: String,
}

impl std::fmt::Debug for ImporterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImporterConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("language", &self.language)
            .finish()
    }
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            username: String::new(),
            password: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl ImporterConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent),
    /// then reads each variable from the process environment. Missing
    /// credentials are logged and replaced by empty strings; the login
    /// handshake is what ultimately rejects them.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_endpoint = lookup("MEDIAWIKI_API_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let username = credential(&lookup, "MEDIAWIKI_USERNAME");
        let password = credential(&lookup, "MEDIAWIKI_PASSWORD");

        let user_agent =
            lookup("MEDIAWIKI_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(val) => val.trim().parse::<u64>().map_err(|_| {
                crate::ImportError::Validation(
                    "REQUEST_TIMEOUT_SECS must be a positive integer".to_string(),
                )
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let language = lookup("LABEL_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let config = Self {
            api_endpoint,
            username,
            password,
            user_agent,
            request_timeout_secs,
            language,
        };

        config
            .validate()
            .map_err(|e| crate::ImportError::Validation(e.to_string()))?;

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn credential<F>(lookup: &F, key: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            error!(key, "credential is not configured, falling back to an empty value");
            String::new()
        }
    }
}
