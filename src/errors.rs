//! Error types shared across the application.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing, validation, or credential failure.
    Config(String),
    /// Caller supplied bad or missing input (HTTP 400).
    Validation(String),
    /// Generation service rejected the credentials (HTTP 401/403).
    Unauthorized(String),
    /// Generation service endpoint does not exist (HTTP 404).
    NotFound(String),
    /// Generation service asked the caller to slow down (HTTP 429).
    RateLimit {
        /// Human-readable detail.
        message: String,
        /// Server-supplied delay before the next attempt, when present.
        retry_after: Option<Duration>,
    },
    /// Generation service failed on its side (HTTP 5xx).
    Service(String),
    /// Connection could not be established or was dropped.
    Network(String),
    /// Request exceeded the configured timeout.
    Timeout(String),
    /// A newer execution for the same step superseded this one.
    Cancelled(String),
    /// No usable payload could be recovered from a service response.
    Parse {
        /// Human-readable detail.
        message: String,
        /// Raw response text, kept for diagnostics.
        raw: String,
    },
    /// Patch text could not be applied at all.
    Diff(String),
    /// Output path failed validation against the output root.
    PathViolation(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl AppError {
    /// Whether the failure is transient and the request may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit { .. } | Self::Service(_) | Self::Network(_) | Self::Timeout(_)
        )
    }

    /// Server-supplied retry hint carried by a rate-limit error.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Build a parse error that keeps the raw response around.
    #[must_use]
    pub fn parse(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            raw: raw.into(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::RateLimit {
                message,
                retry_after: Some(delay),
            } => write!(
                f,
                "rate limited: {message} (retry after {}s)",
                delay.as_secs()
            ),
            Self::RateLimit { message, .. } => write!(f, "rate limited: {message}"),
            Self::Service(msg) => write!(f, "service: {msg}"),
            Self::Network(msg) => write!(f, "network: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Cancelled(msg) => write!(f, "cancelled: {msg}"),
            Self::Parse { message, .. } => write!(f, "parse: {message}"),
            Self::Diff(msg) => write!(f, "diff: {msg}"),
            Self::PathViolation(msg) => write!(f, "path violation: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Io(format!("json serialization failed: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
