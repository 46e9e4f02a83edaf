//! Connection settings: API key, host and scheme.
//!
//! The key is read from `FACTURAPI_KEY` when the config is built from the
//! environment. A missing variable yields an empty key, which is a valid
//! (unauthenticated) state: the server answers such requests with a 401.

use std::env;
use std::fmt;

/// Host (and API version prefix) of the production service.
pub const API_HOST: &str = "www.facturapi.io/v2";

/// Environment variable holding the secret key.
pub const API_KEY_ENV: &str = "FACTURAPI_KEY";

/// Environment variable overriding [`API_HOST`].
pub const API_HOST_ENV: &str = "FACTURAPI_HOST";

const DEFAULT_SCHEME: &str = "https";

/// Settings shared by every request a [`Client`](crate::Client) sends.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    api_key: String,
    host: String,
    scheme: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("scheme", &self.scheme)
            .field("authenticated", &!self.api_key.is_empty())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("")
    }
}

impl Config {
    /// Config for the production host using `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host: API_HOST.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
        }
    }

    /// Build a config from `FACTURAPI_KEY` and `FACTURAPI_HOST`.
    pub fn from_env() -> Self {
        let api_key = env::var(API_KEY_ENV).unwrap_or_default();
        let config = Self::new(api_key);
        match env::var(API_HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => config.with_host(host),
            _ => config,
        }
    }

    /// Replace the host, e.g. `"localhost:3000/v2"`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the URL scheme. Only local mock servers need `http`.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub(crate) fn set_api_key(&mut self, api_key: String) {
        self.api_key = api_key;
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `<scheme>://<host>` without a trailing slash.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}
