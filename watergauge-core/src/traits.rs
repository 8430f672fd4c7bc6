//! Trait definitions for WaterGauge.
//!
//! These traits mark the seams between the portal client and its
//! collaborators: the host consumes a [`UsageSource`], and the client
//! consumes a [`CodeSource`] during two-factor login.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::UsageRecord;

/// Anything that can produce a batch of usage records.
///
/// Implementors own whatever authentication their backend needs. The
/// `&mut self` receiver is the single-writer contract: a host drives at
/// most one fetch at a time per source, and the borrow checker enforces it.
pub trait UsageSource: Send {
    /// Fetches the current usage table.
    ///
    /// Every failure mode collapses into [`CoreError::FetchFailed`] so the
    /// host can treat it as transient and retry on its own schedule.
    fn fetch_usage(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Vec<UsageRecord>, CoreError>> + Send;
}

/// One attempt at retrieving a two-factor verification code.
///
/// A `None` means "no code this attempt" for any reason: nothing matched,
/// the mailbox is not configured, or the check itself failed. Errors are
/// never surfaced here; only the caller's overall deadline is fatal.
#[async_trait]
pub trait CodeSource: Send + Sync {
    /// Performs one check for a verification code.
    ///
    /// `subject_filter` is matched case-insensitively against message
    /// headers by mailbox-backed implementations.
    async fn fetch_code(&self, subject_filter: &str) -> Option<String>;
}
