//! Error types for CVDW fetches.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when fetching a page from the CVDW API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status other than 429.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Upstream throttled the request (HTTP 429).
    #[error("rate limited by upstream")]
    RateLimited,

    /// HTTP success, but the body is not a usable page.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl FetchError {
    /// Whether the failure is worth retrying with backoff.
    ///
    /// Rate limiting is not transient in this sense; it has its own cooldown.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 408,
            FetchError::RateLimited | FetchError::Malformed(_) => false,
        }
    }
}

/// Check if an error is a rate limit error.
pub fn is_rate_limit_error(err: &FetchError) -> bool {
    matches!(
        err,
        FetchError::RateLimited | FetchError::Status { status: 429, .. }
    )
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &FetchError) -> String {
    match err {
        FetchError::Transport(_) => "Network error".to_string(),
        FetchError::Status { status, message } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        FetchError::RateLimited => "Rate limited".to_string(),
        FetchError::Malformed(_) => "Malformed response".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            status: code,
            message: String::new(),
        }
    }

    #[test]
    fn server_errors_and_timeouts_are_transient() {
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(status(408).is_transient());
        assert!(FetchError::Transport("reset".into()).is_transient());
    }

    #[test]
    fn client_errors_are_permanent() {
        assert!(!status(401).is_transient());
        assert!(!status(404).is_transient());
        assert!(!FetchError::Malformed("eof".into()).is_transient());
        assert!(!FetchError::RateLimited.is_transient());
    }

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limit_error(&FetchError::RateLimited));
        assert!(is_rate_limit_error(&status(429)));
        assert!(!is_rate_limit_error(&status(500)));
    }

    #[test]
    fn short_message_truncates_long_bodies() {
        let err = FetchError::Status {
            status: 502,
            message: "x".repeat(80),
        };
        let msg = short_error_message(&err);
        assert!(msg.starts_with("HTTP 502: "));
        assert!(msg.ends_with("..."));
        assert_eq!(short_error_message(&FetchError::RateLimited), "Rate limited");
    }

    #[test]
    fn http_error_becomes_transport() {
        let err: FetchError = HttpError::Transport("dns".into()).into();
        assert!(matches!(err, FetchError::Transport(ref m) if m.contains("dns")));
    }
}
