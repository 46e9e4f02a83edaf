//! Error types for the Facturapi client.
//!
//! # Design
//! Every non-2xx response lands in `Response` with the status code and the
//! body exactly as the server sent it. The library never classifies status
//! codes: a 401 and a 422 are the same kind of failure here, and callers
//! inspect `status` themselves. Query outcomes (`NoResultFound`,
//! `MultipleResultsFound`) and local validation failures get their own
//! variants because they are produced by the client, not the server.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = FacturapiError> = std::result::Result<T, E>;

/// Errors returned by client and resource operations.
#[derive(Debug, Error)]
pub enum FacturapiError {
    /// The server answered with a non-success status.
    #[error("facturapi responded with HTTP {status}: {body}")]
    Response {
        status: u16,
        body: serde_json::Value,
    },

    /// A `one` query matched nothing.
    #[error("no result found")]
    NoResultFound,

    /// A `one` query matched more than one resource.
    #[error("multiple results found where one was expected")]
    MultipleResultsFound,

    /// The request was rejected locally, before any network call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A relation URI did not have the `<resource>/<id>` shape.
    #[error("invalid resource uri: {0}")]
    InvalidUri(String),

    /// The HTTP backend failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A body could not be encoded or decoded.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The request URL could not be assembled.
    #[error("url: {0}")]
    Url(#[from] url::ParseError),
}

impl FacturapiError {
    /// HTTP status of a `Response` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            FacturapiError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_error_displays_status_and_body() {
        let err = FacturapiError::Response {
            status: 401,
            body: json!({"error": "invalid key"}),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("invalid key"));
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn local_errors_have_no_status() {
        assert_eq!(FacturapiError::NoResultFound.status(), None);
        assert_eq!(FacturapiError::Validation("limit".into()).status(), None);
    }
}
