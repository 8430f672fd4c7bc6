// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # WaterGauge Core
//!
//! Core types, models, and traits for the WaterGauge workspace.
//!
//! This crate provides the foundational abstractions shared by the portal
//! client and its consumers:
//!
//! - Domain models ([`UsageRecord`], [`UsageReport`])
//! - Error types ([`CoreError`])
//! - Trait seams for usage and verification-code sources
//!
//! ## Key Types
//!
//! - [`UsageRecord`] - One hourly meter reading parsed from the portal's
//!   CSV export
//! - [`UsageReport`] - The records from one fetch plus latest-record
//!   selection
//! - [`UsageSource`] - Anything that can produce a batch of usage records
//! - [`CodeSource`] - Anything that can yield a 2FA verification code

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{UsageRecord, UsageReport};

// Re-export traits
pub use traits::{CodeSource, UsageSource};
