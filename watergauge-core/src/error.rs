//! Core error types for WaterGauge.

use thiserror::Error;

/// Core error type surfaced to embedding hosts.
///
/// Hosts are expected to treat every [`CoreError::FetchFailed`] as
/// transient and retry on their own schedule; the portal client performs
/// no open-ended retrying of its own.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A fetch could not be completed (transport failure, rejected HTTP
    /// status, or a verification code that never arrived).
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
