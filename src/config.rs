//! Configuration management
//!
//! Credentials and endpoint overrides come from environment variables,
//! optionally seeded from a `.env` file by the binary.

use crate::error::{IndodaxError, IndodaxResult};
use crate::indodax::{ClientConfig, Credentials};

pub const API_KEY_VAR: &str = "INDODAX_API_KEY";
pub const API_SECRET_VAR: &str = "INDODAX_API_SECRET";
/// Older name for the secret, read only when `INDODAX_API_SECRET` is unset
pub const LEGACY_SECRET_VAR: &str = "INDODAX_SECRET_KEY";
pub const PRIVATE_URL_VAR: &str = "INDODAX_TAPI_URL";
pub const PUBLIC_URL_VAR: &str = "INDODAX_PUBLIC_URL";

/// Process configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> IndodaxResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> IndodaxResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or(IndodaxError::MissingCredential(API_KEY_VAR))?;
        let api_secret = get(API_SECRET_VAR)
            .or_else(|| get(LEGACY_SECRET_VAR))
            .ok_or(IndodaxError::MissingCredential(API_SECRET_VAR))?;

        let mut client = ClientConfig::default();
        if let Some(url) = get(PRIVATE_URL_VAR) {
            client = client.with_private_url(validate_url(PRIVATE_URL_VAR, url)?);
        }
        if let Some(url) = get(PUBLIC_URL_VAR) {
            client = client.with_public_url(validate_url(PUBLIC_URL_VAR, url)?);
        }

        Ok(Self {
            credentials: Credentials::new(api_key, api_secret),
            client,
        })
    }
}

fn validate_url(var: &str, url: String) -> IndodaxResult<String> {
    reqwest::Url::parse(&url)
        .map_err(|e| IndodaxError::Config(format!("{} is not a valid URL: {}", var, e)))?;
    Ok(url)
}
