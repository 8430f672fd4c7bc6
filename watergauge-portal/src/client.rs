//! Authenticated portal client.
//!
//! [`PortalClient`] owns the whole session workflow: form login, the
//! optional email-delivered two-factor challenge, and the authenticated
//! CSV download. The host calls [`PortalClient::fetch_usage`] on its own
//! schedule; everything else happens lazily inside.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use watergauge_core::{CodeSource, CoreError, UsageRecord, UsageSource};

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::mailbox::MailboxCodeReader;
use crate::parser::parse_usage_csv;

/// Substrings that mark a login response as a two-factor challenge.
/// Matched case-insensitively against the whole response body.
const TWO_FACTOR_MARKERS: &[&str] = &["verification", "2fa", "two-factor", "otp"];

/// Delay between verification-code mailbox checks.
const CODE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Request timeout for portal endpoints.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Session State
// ============================================================================

/// Authentication state of one portal session.
///
/// Starts [`SessionState::Anonymous`]; becomes
/// [`SessionState::Authenticated`] only after a fully successful login,
/// two-factor included when the portal asks for it. The state never expires
/// on its own: a download rejected with 401/403 resets it and login runs
/// again (once per fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No valid portal session.
    Anonymous,
    /// Login completed; the cookie jar carries the session.
    Authenticated,
}

// ============================================================================
// Portal Client
// ============================================================================

/// Client for a WaterSmart-style utility portal.
///
/// Holds the HTTP client (with its cookie jar), the configuration, and the
/// verification-code source. The `&mut self` receiver on
/// [`PortalClient::fetch_usage`] is the single-writer contract for the
/// session state: drive at most one fetch at a time per client. Run one
/// client per portal account; there is no process-global state.
pub struct PortalClient {
    http: reqwest::Client,
    config: PortalConfig,
    code_source: Arc<dyn CodeSource>,
    session: SessionState,
}

impl PortalClient {
    /// Creates a client whose verification codes come from the configured
    /// IMAP mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Config`] for unusable settings and
    /// [`PortalError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: PortalConfig) -> Result<Self, PortalError> {
        let reader = MailboxCodeReader::new(config.mailbox.clone());
        Self::with_code_source(config, Arc::new(reader))
    }

    /// Creates a client with a custom verification-code source.
    ///
    /// # Errors
    ///
    /// Same as [`PortalClient::new`].
    pub fn with_code_source(
        config: PortalConfig,
        code_source: Arc<dyn CodeSource>,
    ) -> Result<Self, PortalError> {
        config.validate()?;

        // Cookie store carries the portal session across login, verify
        // and download.
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("watergauge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            code_source,
            session: SessionState::Anonymous,
        })
    }

    /// Current session state.
    pub fn session_state(&self) -> SessionState {
        self.session
    }

    /// Downloads and parses the hourly usage export, logging in first when
    /// the session is anonymous.
    ///
    /// Returns records in CSV order; rows that fail to parse are skipped,
    /// and an export with zero parseable rows is a valid empty result.
    ///
    /// # Errors
    ///
    /// [`PortalError::Status`] when login, verification or download answer
    /// with a status ≥ 400, [`PortalError::Transport`] on network failures,
    /// [`PortalError::AuthTimeout`] when a required verification code never
    /// arrives. No partial result accompanies an error.
    #[instrument(skip(self), fields(account = %self.config.portal.username))]
    pub async fn fetch_usage(&mut self) -> Result<Vec<UsageRecord>, PortalError> {
        if self.session == SessionState::Anonymous {
            self.login().await?;
        }

        let body = match self.download_export().await {
            Ok(body) => body,
            Err(PortalError::Status {
                status: status @ (401 | 403),
                ..
            }) => {
                // Stale session: the portal dropped our cookies. Re-run
                // login once and retry; a second rejection is the result.
                warn!(status, "Download rejected, re-running login");
                self.session = SessionState::Anonymous;
                self.login().await?;
                self.download_export().await?
            }
            Err(e) => return Err(e),
        };

        let records = parse_usage_csv(&body);
        info!(records = records.len(), "Fetched usage export");
        Ok(records)
    }

    async fn download_export(&self) -> Result<String, PortalError> {
        let resp = self.http.get(self.config.download_url()).send().await?;
        let status = resp.status().as_u16();
        if status >= 400 {
            return Err(PortalError::Status {
                status,
                context: "usage download",
            });
        }
        Ok(resp.text().await?)
    }

    /// Performs the login flow, including the two-factor branch when the
    /// portal asks for it.
    async fn login(&mut self) -> Result<(), PortalError> {
        debug!("Attempting portal login");

        let params = [
            ("username", self.config.portal.username.as_str()),
            ("password", self.config.portal.password.as_str()),
        ];
        let resp = self
            .http
            .post(self.config.login_url())
            .form(&params)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status >= 400 {
            return Err(PortalError::Status {
                status,
                context: "login",
            });
        }

        let body = resp.text().await?;
        if requires_two_factor(&body) {
            info!("Portal requested a verification code");
            let code = self.wait_for_verification_code().await?;
            self.submit_verification_code(&code).await?;
        }

        self.session = SessionState::Authenticated;
        debug!("Login complete");
        Ok(())
    }

    async fn submit_verification_code(&self, code: &str) -> Result<(), PortalError> {
        let resp = self
            .http
            .post(self.config.verify_url())
            .form(&[("code", code)])
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status >= 400 {
            return Err(PortalError::Status {
                status,
                context: "two-factor verification",
            });
        }
        debug!("Two-factor verification completed");
        Ok(())
    }

    /// Polls the code source until a code arrives or the configured wait
    /// ceiling is exhausted.
    ///
    /// One check per 5-second slot, `floor(wait_time_secs / 5)` attempts
    /// total. An unconfigured mailbox yields no code on every check, so the
    /// wait still runs out and fails informatively instead of hanging.
    async fn wait_for_verification_code(&self) -> Result<String, PortalError> {
        let waited_secs = self.config.mailbox.wait_time_secs;
        let attempts = waited_secs / CODE_POLL_INTERVAL.as_secs();
        debug!(waited_secs, attempts, "Waiting for verification email");

        for attempt in 1..=attempts {
            if let Some(code) = self
                .code_source
                .fetch_code(&self.config.mailbox.subject_filter)
                .await
            {
                debug!(attempt, "Verification code found");
                return Ok(code);
            }
            debug!(attempt, "No verification code yet");
            tokio::time::sleep(CODE_POLL_INTERVAL).await;
        }

        Err(PortalError::AuthTimeout { waited_secs })
    }
}

impl UsageSource for PortalClient {
    fn fetch_usage(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Vec<UsageRecord>, CoreError>> + Send {
        async move { Ok(PortalClient::fetch_usage(self).await?) }
    }
}

/// Returns true if a login response body is a two-factor challenge.
fn requires_two_factor(body: &str) -> bool {
    let lower = body.to_lowercase();
    TWO_FACTOR_MARKERS.iter().any(|marker| lower.contains(marker))
}

// ============================================================================
// Tests
// ============================================================================
