//! Upload coordination with local fallback.

use std::sync::Arc;
use tracing::{debug, info, warn};

use pinstore_common::{ContentId, Document, Result};

use crate::address::ContentAddresser;
use crate::local::LocalStore;
use crate::provider::PinningProvider;

/// Where an uploaded document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOrigin {
    /// Pinned by the named remote provider.
    Provider { provider: String },
    /// Stored in the local fallback store after the provider failed.
    Fallback { reason: String },
}

/// Identifier returned by an upload, with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub cid: ContentId,
    pub origin: UploadOrigin,
}

impl UploadReceipt {
    /// Check if the document went to the fallback store.
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, UploadOrigin::Fallback { .. })
    }
}

/// Attempts one remote upload per document and falls back to the local
/// store on any failure. Never fails.
pub struct UploadCoordinator {
    provider: Arc<dyn PinningProvider>,
    store: Arc<LocalStore>,
}

impl UploadCoordinator {
    /// Create a coordinator over the active provider and a shared store.
    pub fn new(provider: Arc<dyn PinningProvider>, store: Arc<LocalStore>) -> Self {
        Self { provider, store }
    }

    /// Get the active provider name.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Upload a document and return its identifier.
    pub async fn upload(&self, document: &Document) -> ContentId {
        self.upload_with_receipt(document).await.cid
    }

    /// Upload a document and report where it was stored.
    pub async fn upload_with_receipt(&self, document: &Document) -> UploadReceipt {
        let bytes = ContentAddresser::canonical_bytes(document);

        match self.attempt_remote(bytes.clone()).await {
            Ok(cid) => {
                info!(provider = self.provider.name(), cid = %cid, "Upload succeeded");
                UploadReceipt {
                    cid,
                    origin: UploadOrigin::Provider {
                        provider: self.provider.name().to_string(),
                    },
                }
            }
            Err(err) => {
                warn!(
                    provider = self.provider.name(),
                    error = %err,
                    "Upload failed, falling back to local store"
                );
                let cid = self.store_locally(document, &bytes);
                UploadReceipt {
                    cid,
                    origin: UploadOrigin::Fallback {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }

    async fn attempt_remote(&self, bytes: Vec<u8>) -> Result<ContentId> {
        debug!(provider = self.provider.name(), size = bytes.len(), "Attempting remote upload");
        self.provider.upload(bytes).await
    }

    fn store_locally(&self, document: &Document, bytes: &[u8]) -> ContentId {
        let cid = ContentAddresser::identify_bytes(bytes);
        if self.store.insert(cid.clone(), document.clone()).is_some() {
            debug!(cid = %cid, "Replaced existing local entry");
        }
        info!(cid = %cid, "Stored document locally");
        cid
    }
}
