//! Error types for Okta API calls.
//!
//! Responses are classified once, when they come back from the wire. The
//! classification decides whether a call is retried: only
//! [`ApiError::RateLimited`] responses are, everything else surfaces as-is.

use serde::Deserialize;

/// Errors that can occur while talking to the Okta management API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The requested object does not exist (HTTP 404).
    #[error("Not found: {summary}")]
    NotFound {
        /// Okta error code, e.g. `E0000007`.
        code: Option<String>,
        /// Human readable error summary.
        summary: String,
    },

    /// The API kept answering HTTP 429 until the retry budget was exhausted.
    #[error("Rate limited after {attempts} attempt(s)")]
    RateLimited {
        /// Total number of attempts made, including the first one.
        attempts: u32,
    },

    /// The API token was rejected (HTTP 401 / 403).
    #[error("Unauthorized (HTTP {status}): {summary}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Human readable error summary.
        summary: String,
    },

    /// Any other non-success HTTP response.
    #[error("HTTP {status}: {summary}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Okta error code, if the body carried one.
        code: Option<String>,
        /// Human readable error summary.
        summary: String,
    },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The caller cancelled the call before any response was classified.
    #[error("Request cancelled")]
    Cancelled,

    /// The client configuration is unusable.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(summary: impl Into<String>) -> Self {
        Self::NotFound {
            code: None,
            summary: summary.into(),
        }
    }

    /// Creates a new `Network` error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a new `InvalidConfig` error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Returns `true` for HTTP 404 responses.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` once the retry budget for HTTP 429 responses is spent.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// HTTP status associated with the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Unauthorized { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::Cancelled | Self::InvalidConfig(_) => None,
        }
    }

    /// Classifies a non-success response into an error.
    ///
    /// 429 is mapped to `RateLimited { attempts: 1 }`; the retry loop replaces
    /// the attempt count when it gives up.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let code = parsed.as_ref().and_then(|b| b.error_code.clone());
        let summary = parsed
            .map(ErrorBody::into_summary)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.to_string()
                }
            });

        match status {
            404 => Self::NotFound { code, summary },
            429 => Self::RateLimited { attempts: 1 },
            401 | 403 => Self::Unauthorized { status, summary },
            _ => Self::Http {
                status,
                code,
                summary,
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Error document returned by the Okta API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_summary: Option<String>,
    #[serde(default)]
    error_causes: Vec<ErrorCause>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorCause {
    #[serde(default)]
    error_summary: Option<String>,
}

impl ErrorBody {
    fn into_summary(self) -> String {
        let mut parts: Vec<String> = self.error_summary.into_iter().collect();
        parts.extend(
            self.error_causes
                .into_iter()
                .filter_map(|c| c.error_summary),
        );
        parts.join("; ")
    }
}

/// Result alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
