//! Client credentials and endpoint configuration.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_OAUTH_BASE_URL: &str = "https://www.linkedin.com/oauth/v2";
pub const DEFAULT_API_BASE_URL: &str = "https://api.linkedin.com/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CLIENT_ID_VAR: &str = "LINKEDIN_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "LINKEDIN_CLIENT_SECRET";
const REDIRECT_URI_VAR: &str = "LINKEDIN_REDIRECT_URI";
const OAUTH_URL_VAR: &str = "LINKEDIN_OAUTH_URL";
const API_URL_VAR: &str = "LINKEDIN_API_URL";
const TIMEOUT_VAR: &str = "LINKEDIN_TIMEOUT_SECS";

/// Application credentials registered with LinkedIn.
///
/// Values are not validated; an empty client id only shows up as a provider
/// error once a request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Read `LINKEDIN_CLIENT_ID`, `LINKEDIN_CLIENT_SECRET` and
    /// `LINKEDIN_REDIRECT_URI`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(
            required(CLIENT_ID_VAR)?,
            required(CLIENT_SECRET_VAR)?,
            required(REDIRECT_URI_VAR)?,
        ))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

/// Endpoint bases and transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub oauth_base_url: String,
    pub api_base_url: String,
    /// Per-call timeout applied by the default transport.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ClientOptions {
    /// Defaults overlaid with `LINKEDIN_OAUTH_URL`, `LINKEDIN_API_URL` and
    /// `LINKEDIN_TIMEOUT_SECS` when set. A timeout of `0` disables it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if let Some(url) = optional(OAUTH_URL_VAR) {
            options.oauth_base_url = url;
        }
        if let Some(url) = optional(API_URL_VAR) {
            options.api_base_url = url;
        }
        if let Some(raw) = optional(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            options.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(options)
    }

    pub fn with_oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_base_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
