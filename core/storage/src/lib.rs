//! Content-addressed JSON storage over remote pinning providers.
//!
//! A document is pinned through exactly one configured provider. When that
//! attempt fails, the document is addressed locally and kept in an
//! in-process store, so `upload` always yields an identifier and `retrieve`
//! never errors.
//!
//! # Design Principles
//! - Provider isolation: service-specific HTTP lives under [`providers`]
//! - One attempt per call: no retries against remote services
//! - Owned fallback state: each [`PinningService`] holds its own [`LocalStore`]
//! - Failures become tracing observations plus a defined fallback outcome

pub mod address;
pub mod local;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod retrieve;
pub mod service;
pub mod upload;

pub use address::{identify, ContentAddresser};
pub use local::{LocalStore, StoredDocument};
pub use provider::PinningProvider;
pub use registry::{create_default_registry, select_provider, ProviderFactory, ProviderRegistry};
pub use retrieve::RetrievalCoordinator;
pub use service::PinningService;
pub use upload::{UploadCoordinator, UploadOrigin, UploadReceipt};
