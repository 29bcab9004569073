//! Authenticated HTTP transport.
//!
//! One [`Transport`] per configured server: it joins path segments onto the
//! base address, attaches the auth headers to every request, applies the
//! fixed per-call deadline, decodes JSON responses, and classifies failures
//! into the [`ApiError`] taxonomy. Nothing above this layer ever sees an
//! HTTP status code.
//!
//! The transport holds no mutable state and is shared across all resource
//! clients behind an `Arc`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crank_domain::ApiError;

use crate::config::Config;

/// Fixed deadline applied to every call. Exceeding it surfaces as
/// [`ApiError::Timeout`]; no layer in this workspace retries — retry policy
/// belongs to the caller.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the API key id.
const API_KEY_ID_HEADER: &str = "x-api-key-id";
/// Header carrying the API key secret.
const API_KEY_SECRET_HEADER: &str = "x-api-key-secret";
/// Header carrying the account email.
const EMAIL_HEADER: &str = "x-email";

/// Authenticated HTTP access to one Crank server.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base: Url,
}

impl Transport {
    /// Builds a transport for the given configuration.
    ///
    /// Fails with [`ApiError::Config`] when the base address does not parse
    /// or a required auth field is missing — before any network call.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    fn with_timeout(config: &Config, timeout: Duration) -> Result<Self, ApiError> {
        config.validate()?;
        let base = Url::parse(&config.address).map_err(|e| ApiError::Config {
            message: format!("cannot parse base address {:?}: {e}", config.address),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Config {
                message: format!("base address {:?} cannot carry a path", config.address),
            });
        }

        let mut headers = HeaderMap::new();
        for (name, value) in [
            (API_KEY_ID_HEADER, &config.api_key_id),
            (API_KEY_SECRET_HEADER, &config.api_key_secret),
            (EMAIL_HEADER, &config.email),
        ] {
            let value = HeaderValue::from_str(value).map_err(|_| ApiError::Config {
                message: format!("{name} contains characters not permitted in a header"),
            })?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config { message: format!("cannot build http client: {e}") })?;
        Ok(Self { http, base })
    }

    /// Resolves `segments` against the base address.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| ApiError::Config {
                message: format!("base address {:?} cannot carry a path", self.base),
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// GET returning a decoded JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        self.execute_json(Method::GET, segments, None::<&()>).await
    }

    /// POST with a JSON body, returning a decoded JSON body.
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute_json(Method::POST, segments, Some(body)).await
    }

    /// POST with an optional JSON body, discarding any response body.
    pub(crate) async fn post_empty<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        self.execute(Method::POST, segments, body).await.map(drop)
    }

    /// DELETE, discarding any response body.
    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        self.execute(Method::DELETE, segments, None::<&()>).await.map(drop)
    }

    async fn execute_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let response = self.execute(method, segments, body).await?;
        let url = response.url().clone();
        response.json::<T>().await.map_err(|e| decode_error(&url, e))
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(segments)?;
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        tracing::debug!(%method, %url, "sending request");
        let response = request.send().await.map_err(|e| send_error(&url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, &url));
        }
        Ok(response)
    }
}

fn send_error(url: &Url, err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout { url: url.to_string() }
    } else {
        ApiError::Transport { url: url.to_string(), message: err.to_string() }
    }
}

fn decode_error(url: &Url, err: reqwest::Error) -> ApiError {
    // A body read can also run into the deadline; keep the classification.
    if err.is_timeout() {
        ApiError::Timeout { url: url.to_string() }
    } else {
        ApiError::Transport { url: url.to_string(), message: format!("cannot decode body: {err}") }
    }
}

/// Maps a non-2xx status onto the taxonomy. 404, 409 and the payload
/// rejections get their own variants; everything else stays a plain
/// `Remote` with the code preserved (no JSON error body is assumed).
fn status_error(status: StatusCode, url: &Url) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound { url: url.to_string() },
        StatusCode::CONFLICT => ApiError::Conflict { url: url.to_string() },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation {
            message: format!("server rejected payload at {url} (status {})", status.as_u16()),
        },
        _ => ApiError::Remote { code: status.as_u16(), url: url.to_string() },
    }
}
