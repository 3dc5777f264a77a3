//! Error types for cluster client operations.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by the transport and the resource sub-clients.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (connection refused, DNS, TLS,
    /// timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The cluster answered with a status the operation does not accept.
    /// The body is the cluster's own error document, kept verbatim.
    #[error("{context} ({status}): {body}")]
    Status {
        status: u16,
        context: String,
        body: String,
    },

    /// A named resource is absent from the listing.
    #[error("{kind} {name:?} not found")]
    NotFound { kind: &'static str, name: String },

    /// JSON could not be encoded or decoded.
    #[error("invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl ClientError {
    pub fn status(status: u16, context: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            context: context.into(),
            body: body.into(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// HTTP status carried by the error, if the cluster answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The resource is absent, either from a listing or per a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. }) || self.http_status() == Some(404)
    }

    /// The cluster does not serve this API at all.
    ///
    /// True for not-found errors and for the `no handler found` answer that
    /// both engines give (as 400 or 405) for unknown routes.
    pub fn is_missing_endpoint(&self) -> bool {
        match self {
            Self::Status { status, body, .. } if matches!(status, 400 | 405) => {
                is_unknown_route(body)
            }
            _ => self.is_not_found(),
        }
    }
}

/// Body of an "unknown route" answer.
pub(crate) fn is_unknown_route(body: &str) -> bool {
    body.to_ascii_lowercase().contains("no handler found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_body() {
        let err = ClientError::status(400, "error creating index", r#"{"error":"already_exists"}"#);
        assert_eq!(err.http_status(), Some(400));
        assert!(err.to_string().contains(r#"{"error":"already_exists"}"#));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_missing_endpoint_classification() {
        assert!(ClientError::status(404, "x", "").is_missing_endpoint());
        assert!(ClientError::not_found("index", "logs").is_missing_endpoint());
        assert!(
            ClientError::status(
                400,
                "x",
                r#"{"error":"no handler found for uri [/_ilm/policy/*] and method [GET]"}"#
            )
            .is_missing_endpoint()
        );
        assert!(!ClientError::status(400, "x", r#"{"error":"bad request"}"#).is_missing_endpoint());
        assert!(!ClientError::status(500, "x", "no handler found").is_missing_endpoint());
        assert!(!ClientError::Transport("connection refused".to_string()).is_missing_endpoint());
    }

    #[test]
    fn test_undecodable_body_is_a_decode_error() {
        let response = crate::client::RawResponse::new(200, "not json");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        assert!(err.to_string().starts_with("invalid JSON payload"));
    }
}
