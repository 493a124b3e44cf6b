use thiserror::Error;

/// Failure talking to the upstream catalog. Never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid catalog base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Upstream request failed: {0}")]
    Request(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream responded with status {0}")]
    Status(u16),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}
