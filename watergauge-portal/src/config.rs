//! Configuration for the portal client and its verification-code mailbox.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PortalError;

/// Login endpoint path, relative to the portal base URL.
pub const LOGIN_PATH: &str = "/index.php/auth/login";

/// Two-factor verification endpoint path.
pub const VERIFY_PATH: &str = "/index.php/auth/verify";

/// Hourly CSV export endpoint path.
pub const DOWNLOAD_PATH: &str = "/index.php/Download/hourly?combined=0";

// ============================================================================
// Config Types
// ============================================================================

/// Full client configuration: portal account plus optional mailbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal connection and account settings.
    pub portal: PortalSettings,
    /// Verification-code mailbox settings. Optional: without a mailbox
    /// host, accounts with two-factor enabled cannot complete login, but
    /// accounts without it work normally.
    #[serde(default)]
    pub mailbox: MailboxConfig,
}

/// Portal connection and account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSettings {
    /// Base URL of the utility's portal, e.g.
    /// `https://austintx.watersmart.com`.
    pub base_url: String,
    /// Portal account username.
    pub username: String,
    /// Portal account password.
    pub password: String,
}

/// Settings for the mailbox that receives verification codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// IMAP host. `None` disables mailbox checks entirely.
    #[serde(default)]
    pub host: Option<String>,
    /// IMAP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Mailbox login username.
    #[serde(default)]
    pub username: String,
    /// Mailbox login password.
    #[serde(default)]
    pub password: String,
    /// Folder to search for verification messages.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Case-insensitive substring a message's headers must contain.
    #[serde(default = "default_subject_filter")]
    pub subject_filter: String,
    /// Ceiling in seconds on how long to wait for a code to arrive.
    #[serde(default = "default_wait_time")]
    pub wait_time_secs: u64,
}

fn default_port() -> u16 {
    993
}

fn default_folder() -> String {
    "INBOX".to_string()
}

fn default_subject_filter() -> String {
    "verification".to_string()
}

fn default_wait_time() -> u64 {
    90
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            username: String::new(),
            password: String::new(),
            folder: default_folder(),
            subject_filter: default_subject_filter(),
            wait_time_secs: default_wait_time(),
        }
    }
}

// ============================================================================
// Loading & Validation
// ============================================================================

impl PortalConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("watergauge")
            .join("config.toml")
    }

    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Config`] if the file is missing, unreadable,
    /// or not valid TOML. Unlike optional app settings, portal credentials
    /// have no usable default.
    pub fn load() -> Result<Self, PortalError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Config`] on a missing/unreadable file or
    /// invalid TOML.
    pub fn load_from(path: &Path) -> Result<Self, PortalError> {
        debug!(path = %path.display(), "Loading configuration");

        let content = std::fs::read_to_string(path).map_err(|e| {
            PortalError::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| PortalError::Config(format!("invalid TOML in {}: {e}", path.display())))?;

        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Checks that the settings are usable before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Config`] for an unparseable base URL or empty
    /// credentials.
    pub fn validate(&self) -> Result<(), PortalError> {
        reqwest::Url::parse(&self.portal.base_url)
            .map_err(|e| PortalError::Config(format!("invalid base_url: {e}")))?;
        if self.portal.username.is_empty() {
            return Err(PortalError::Config("username is empty".to_string()));
        }
        if self.portal.password.is_empty() {
            return Err(PortalError::Config("password is empty".to_string()));
        }
        Ok(())
    }

    /// Full login endpoint URL.
    pub fn login_url(&self) -> String {
        self.join(LOGIN_PATH)
    }

    /// Full verification endpoint URL.
    pub fn verify_url(&self) -> String {
        self.join(VERIFY_PATH)
    }

    /// Full CSV download endpoint URL.
    pub fn download_url(&self) -> String {
        self.join(DOWNLOAD_PATH)
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.portal.base_url.trim_end_matches('/'), path)
    }
}

// ============================================================================
// Tests
// ============================================================================
