// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # WaterGauge Portal
//!
//! Client for WaterSmart-style municipal utility portals.
//!
//! The portal speaks a session-cookie protocol: a form login, an optional
//! email-delivered two-factor challenge, and an authenticated CSV export of
//! hourly readings. [`PortalClient`] owns that whole workflow behind one
//! operation, [`PortalClient::fetch_usage`].
//!
//! ## Modules
//!
//! - [`client`] - The authenticated session state machine
//! - [`config`] - Portal and mailbox configuration (TOML)
//! - [`mailbox`] - IMAP reader for emailed verification codes
//! - [`parser`] - CSV export parsing
//! - [`error`] - Error taxonomy
//!
//! ## Example
//!
//! ```ignore
//! use watergauge_portal::{PortalClient, PortalConfig};
//!
//! let config = PortalConfig::load()?;
//! let mut client = PortalClient::new(config)?;
//! let records = client.fetch_usage().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod parser;

// Re-export key types at crate root
pub use client::{PortalClient, SessionState};
pub use config::{MailboxConfig, PortalConfig};
pub use error::PortalError;
pub use mailbox::MailboxCodeReader;
pub use parser::parse_usage_csv;
