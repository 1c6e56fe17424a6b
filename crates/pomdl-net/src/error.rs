use thiserror::Error;

/// Network-level failure of a single request attempt.
///
/// Only the timeout variants are transient; everything else is terminal for
/// the attempt and never retried.
#[derive(Clone, Debug, Error)]
pub enum TransportError {
    #[error("connect timed out: {0}")]
    ConnectTimeout(String),

    #[error("read timed out: {0}")]
    ReadTimeout(String),

    #[error("TLS negotiation failed: {0}")]
    Tls(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectTimeout(_) | TransportError::ReadTimeout(_)
        )
    }

    /// Stable short name for metrics tagging.
    pub fn class_name(&self) -> &'static str {
        match self {
            TransportError::ConnectTimeout(_) => "connect_timeout",
            TransportError::ReadTimeout(_) => "read_timeout",
            TransportError::Tls(_) => "tls",
            TransportError::InvalidUrl(_) => "invalid_url",
            TransportError::Other(_) => "network",
        }
    }
}
