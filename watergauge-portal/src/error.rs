//! Portal error types.

use thiserror::Error;
use watergauge_core::CoreError;

/// Error type for portal operations.
///
/// Everything here is host-facing "the fetch failed"; per-row CSV problems
/// never reach this type (bad rows are logged and skipped in the parser).
#[derive(Debug, Error)]
pub enum PortalError {
    /// Transport-level HTTP failure (connect, TLS, timeout, body read).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The portal answered with a rejecting HTTP status.
    #[error("{context} failed with status {status}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Which step was rejected (login, verification, download).
        context: &'static str,
    },

    /// The two-factor verification code never arrived in time.
    #[error("timed out after {waited_secs}s waiting for verification code")]
    AuthTimeout {
        /// The configured wait ceiling that was exhausted.
        waited_secs: u64,
    },

    /// Invalid portal configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<PortalError> for CoreError {
    /// Collapses the portal taxonomy into the single host-facing category.
    fn from(err: PortalError) -> Self {
        CoreError::FetchFailed(err.to_string())
    }
}
