//! Error taxonomy for calls against the Crank server.
//!
//! [`ApiError`] is the single classification every port operation can fail
//! with. Infrastructure maps its own failure modes (connection errors,
//! status codes, decode failures) into these variants; nothing above the
//! transport ever inspects an HTTP status directly.
//!
//! Observability is deliberately separate from the error value: no layer
//! logs an error it also returns. The boundary that consumes the error
//! decides how (and whether) to log it, exactly once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failed call against the Crank server, classified.
///
/// The variants are disjoint by construction:
///
/// - [`Config`](ApiError::Config) is produced before any network call.
/// - [`Transport`](ApiError::Transport) and [`Timeout`](ApiError::Timeout)
///   mean no usable HTTP status was obtained; neither is retried by this
///   library — retry policy belongs to the caller.
/// - The remaining variants carry a definite server response.
///   [`NotFound`](ApiError::NotFound), [`Conflict`](ApiError::Conflict) and
///   [`Validation`](ApiError::Validation) are the statuses the reconciler
///   gives meaning to; every other non-2xx status is a plain
///   [`Remote`](ApiError::Remote) with the code and URL preserved for
///   diagnosis (no JSON error body is assumed).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ApiError {
    /// The client configuration is unusable (bad base address, missing auth
    /// field). Fails fast, before any network call.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// The request never produced an HTTP status: DNS failure, connection
    /// refused, or a 2xx body that could not be decoded.
    #[error("transport failure for {url}: {message}")]
    Transport {
        /// The URL the request was sent to.
        url: String,
        /// Description of the underlying failure.
        message: String,
    },

    /// The call exceeded the transport's fixed deadline.
    #[error("request to {url} timed out")]
    Timeout {
        /// The URL the request was sent to.
        url: String,
    },

    /// The server answered with a non-2xx status not covered by a more
    /// specific variant.
    #[error("server returned status {code} for {url}")]
    Remote {
        /// The HTTP status code.
        code: u16,
        /// The URL the request was sent to.
        url: String,
    },

    /// The server reported the addressed resource does not exist (404).
    #[error("resource not found at {url}")]
    NotFound {
        /// The URL the request was sent to.
        url: String,
    },

    /// A relationship add/remove contradicted server state (409): the edge
    /// already existed, or was already gone. Signals a concurrent external
    /// mutation; always surfaced, never auto-resolved.
    #[error("conflict with server state at {url}")]
    Conflict {
        /// The URL the request was sent to.
        url: String,
    },

    /// The server (or a local pre-flight check) rejected the payload, e.g.
    /// an attempted mutation of an immutable field.
    #[error("payload rejected: {message}")]
    Validation {
        /// Description of the rejected payload.
        message: String,
    },
}

impl ApiError {
    /// `true` for the 404-class failure the reconciler maps to
    /// re-create-on-missing (update cycle) or no-op (destroy).
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// `true` when the failure signals a concurrent external mutation of a
    /// relationship.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }

    /// `true` when the call exceeded the transport deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }
}
