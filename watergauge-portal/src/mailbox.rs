//! IMAP reader for emailed verification codes.
//!
//! One call is one synchronous mailbox check: connect over TLS, select the
//! folder, search for unread messages, fetch their header blocks only, and
//! scan the first message whose headers contain the subject filter for a
//! 6-digit code. The matched message is marked `\Seen` so a stale code is
//! not re-delivered on a later fetch cycle.
//!
//! Mail-side failures are never fatal: every connection, protocol or auth
//! error becomes "no code this attempt" and only the caller's overall wait
//! deadline ends the polling.

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};
use watergauge_core::CodeSource;

use crate::config::MailboxConfig;

/// Verification codes are 6 contiguous digits anywhere in the headers.
const CODE_PATTERN: &str = r"\d{6}";

#[derive(Debug, Error)]
enum MailError {
    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("IMAP error: {0}")]
    Imap(#[from] imap::error::Error),
}

/// Reads verification codes from an IMAP mailbox.
pub struct MailboxCodeReader {
    config: MailboxConfig,
    code_pattern: Regex,
}

impl MailboxCodeReader {
    /// Creates a reader for the given mailbox settings.
    pub fn new(config: MailboxConfig) -> Self {
        Self {
            config,
            code_pattern: Regex::new(CODE_PATTERN).expect("static pattern compiles"),
        }
    }
}

#[async_trait]
impl CodeSource for MailboxCodeReader {
    /// Runs one blocking mailbox check on the blocking-task pool so a slow
    /// IMAP round trip never stalls the async scheduler.
    async fn fetch_code(&self, subject_filter: &str) -> Option<String> {
        let Some(host) = self.config.host.clone() else {
            debug!("No mailbox host configured, skipping check");
            return None;
        };

        let config = self.config.clone();
        let pattern = self.code_pattern.clone();
        let filter = subject_filter.to_string();

        let result =
            tokio::task::spawn_blocking(move || check_mailbox(&config, &host, &filter, &pattern))
                .await;

        match result {
            Ok(Ok(code)) => code,
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read verification email");
                None
            }
            Err(e) => {
                warn!(error = %e, "Mailbox check task failed");
                None
            }
        }
    }
}

/// One full IMAP round trip. Header blocks only (`RFC822.HEADER`), so an
/// unmatched message is left unread.
fn check_mailbox(
    config: &MailboxConfig,
    host: &str,
    subject_filter: &str,
    pattern: &Regex,
) -> Result<Option<String>, MailError> {
    let tls = native_tls::TlsConnector::builder().build()?;
    let client = imap::connect((host, config.port), host, &tls)?;
    let mut session = client
        .login(&config.username, &config.password)
        .map_err(|(e, _)| e)?;

    session.select(&config.folder)?;

    let mut unseen: Vec<u32> = session.search("UNSEEN")?.into_iter().collect();
    unseen.sort_unstable();
    debug!(unseen = unseen.len(), "Searched mailbox for unread messages");

    let mut found: Option<(u32, String)> = None;
    for seq in unseen {
        let fetches = session.fetch(seq.to_string(), "RFC822.HEADER")?;
        let Some(fetch) = fetches.iter().next() else {
            continue;
        };
        let Some(header_bytes) = fetch.header() else {
            continue;
        };

        let headers = String::from_utf8_lossy(header_bytes);
        if let Some(code) = extract_code(&headers, subject_filter, pattern) {
            found = Some((seq, code));
            break;
        }
    }

    if let Some((seq, code)) = found {
        session.store(seq.to_string(), "+FLAGS (\\Seen)")?;
        session.logout().ok();
        debug!(seq, "Found verification code");
        return Ok(Some(code));
    }

    session.logout().ok();
    Ok(None)
}

/// Scans one header block: the subject filter must appear (any case), and
/// the first 6-digit run is the code.
fn extract_code(headers: &str, subject_filter: &str, pattern: &Regex) -> Option<String> {
    if !headers
        .to_lowercase()
        .contains(&subject_filter.to_lowercase())
    {
        return None;
    }
    pattern.find(headers).map(|m| m.as_str().to_string())
}

// ============================================================================
// Tests
// ============================================================================
