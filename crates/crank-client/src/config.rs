//! Client configuration.
//!
//! Four options are recognised: the server base address and the
//! key-id/key-secret/email auth triple. Each can be supplied directly or
//! read from its environment variable; only the address has a default.
//! Validation happens once, when the transport is built — a bad address or
//! missing auth field fails fast, before any network call.

use std::env;

use crank_domain::ApiError;

/// Default server address, used when `CRANK_ADDRESS` is unset.
pub const DEFAULT_ADDRESS: &str = "http://localhost:9998";

/// Environment variable overriding the server base address.
pub const ADDRESS_ENV: &str = "CRANK_ADDRESS";
/// Environment variable overriding the API key id.
pub const API_KEY_ID_ENV: &str = "CRANK_API_KEY_ID";
/// Environment variable overriding the API key secret.
pub const API_KEY_SECRET_ENV: &str = "CRANK_API_KEY_SECRET";
/// Environment variable overriding the account email.
pub const EMAIL_ENV: &str = "CRANK_EMAIL";

/// Connection settings for a Crank server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the server, e.g. `http://localhost:9998`.
    pub address: String,
    /// API key id of the service account.
    pub api_key_id: String,
    /// API key secret of the service account.
    pub api_key_secret: String,
    /// Email of the account the key pair belongs to.
    pub email: String,
}

impl Config {
    /// Creates a configuration from explicit values.
    pub fn new(
        address: impl Into<String>,
        api_key_id: impl Into<String>,
        api_key_secret: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            api_key_id: api_key_id.into(),
            api_key_secret: api_key_secret.into(),
            email: email.into(),
        }
    }

    /// Reads the configuration from the `CRANK_*` environment variables.
    ///
    /// The address falls back to [`DEFAULT_ADDRESS`]; the auth triple is
    /// required and produces [`ApiError::Config`] when absent.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self {
            address: env::var(ADDRESS_ENV).unwrap_or_else(|_| DEFAULT_ADDRESS.to_string()),
            api_key_id: required(API_KEY_ID_ENV)?,
            api_key_secret: required(API_KEY_SECRET_ENV)?,
            email: required(EMAIL_ENV)?,
        })
    }

    /// Checks that every required field is present.
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        for (name, value) in [
            ("address", &self.address),
            ("api_key_id", &self.api_key_id),
            ("api_key_secret", &self.api_key_secret),
            ("email", &self.email),
        ] {
            if value.is_empty() {
                return Err(ApiError::Config { message: format!("{name} must not be empty") });
            }
        }
        Ok(())
    }
}

fn required(name: &str) -> Result<String, ApiError> {
    env::var(name).map_err(|_| ApiError::Config {
        message: format!("required environment variable {name} is not set"),
    })
}
