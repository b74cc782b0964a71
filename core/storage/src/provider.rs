//! Pinning provider trait definition.

use async_trait::async_trait;
use bytes::Bytes;

use pinstore_common::{ContentId, Result};

/// A remote pinning service.
///
/// Implementations perform exactly one network attempt per call and leave
/// retry and fallback decisions to the coordinators.
#[async_trait]
pub trait PinningProvider: Send + Sync {
    /// Get the provider name (e.g., "pinata", "web3storage", "local").
    fn name(&self) -> &str;

    /// Pin serialized document bytes.
    ///
    /// # Postconditions
    /// - Returns the non-empty identifier assigned by the service
    ///
    /// # Errors
    /// - Network/transport errors and timeouts
    /// - Non-success status
    /// - Response without the provider's identifier field
    async fn upload(&self, data: Vec<u8>) -> Result<ContentId>;

    /// Gateway URL serving `id` for this provider.
    fn gateway_url(&self, id: &ContentId) -> String;

    /// Read the body served by the gateway for `id`.
    ///
    /// # Errors
    /// - Network/transport errors
    /// - Non-success status
    async fn fetch(&self, id: &ContentId) -> Result<Bytes>;
}
