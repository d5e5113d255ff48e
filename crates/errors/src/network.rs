//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum NetworkError {
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("beatmap not found at {url}")]
    NotFound { url: String },

    #[error("forbidden / auth required at {url}")]
    Forbidden { url: String },

    #[error("unauthorized at {url}")]
    Unauthorized { url: String },

    #[error("rate-limited by {url}")]
    RateLimited {
        url: String,
        retry_after: Option<u64>,
    },

    #[error("service unavailable at {url}")]
    ServiceUnavailable { url: String },

    #[error("gateway timeout at {url}")]
    GatewayTimeout { url: String },

    #[error("bad request / invalid identifier at {url}")]
    BadRequest { url: String },

    #[error("server error at {url}")]
    ServerError { url: String },

    #[error("HTTP error {status} from {url}")]
    HttpError { status: u16, url: String },
}

impl NetworkError {
    /// Classify a non-success HTTP status returned for `url`
    #[must_use]
    pub fn from_status(status: u16, url: impl Into<String>) -> Self {
        let url = url.into();
        match status {
            400 => Self::BadRequest { url },
            401 => Self::Unauthorized { url },
            403 => Self::Forbidden { url },
            404 => Self::NotFound { url },
            429 => Self::RateLimited {
                url,
                retry_after: None,
            },
            500 => Self::ServerError { url },
            503 => Self::ServiceUnavailable { url },
            504 => Self::GatewayTimeout { url },
            _ => Self::HttpError { status, url },
        }
    }

    /// HTTP status behind this error, when it came from a response
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::ServerError { .. } => Some(500),
            Self::ServiceUnavailable { .. } => Some(503),
            Self::GatewayTimeout { .. } => Some(504),
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::GatewayTimeout { .. } => {
                Some("The source responded too slowly; try again later or raise the timeout.")
            }
            Self::ConnectionFailed(_) => Some("Check your network connection."),
            Self::RateLimited { .. } => Some("Wait a moment before requesting more beatmaps."),
            Self::NotFound { .. } | Self::BadRequest { .. } => {
                Some("Double-check the beatmap set ID.")
            }
            Self::Forbidden { .. } | Self::Unauthorized { .. } => {
                Some("The source requires authentication; provide a session cookie.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Timeout { .. } => "network.timeout",
            Self::ConnectionFailed(_) => "network.connection_failed",
            Self::DownloadFailed(_) => "network.download_failed",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::NotFound { .. } => "network.not_found",
            Self::Forbidden { .. } => "network.forbidden",
            Self::Unauthorized { .. } => "network.unauthorized",
            Self::RateLimited { .. } => "network.rate_limited",
            Self::ServiceUnavailable { .. } => "network.service_unavailable",
            Self::GatewayTimeout { .. } => "network.gateway_timeout",
            Self::BadRequest { .. } => "network.bad_request",
            Self::ServerError { .. } => "network.server_error",
            Self::HttpError { .. } => "network.http_error",
        };
        Some(code)
    }
}
