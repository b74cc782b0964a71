//! Common utilities and types shared across pinstore crates.
//!
//! This module provides the identifier, document and configuration types
//! used by the storage coordinators and the CLI, plus the shared error type.

pub mod config;
pub mod error;
pub mod types;

pub use config::{PinningConfig, ProviderKind};
pub use error::{Error, Result};
pub use types::{ContentId, Document, Secret};
