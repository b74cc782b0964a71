//! Pinning service façade.

use std::sync::Arc;
use tracing::info;

use pinstore_common::{ContentId, Document, PinningConfig, Result};

use crate::local::LocalStore;
use crate::provider::PinningProvider;
use crate::registry::{create_default_registry, select_provider, ProviderRegistry};
use crate::retrieve::RetrievalCoordinator;
use crate::upload::{UploadCoordinator, UploadReceipt};

/// Upload and retrieval over one active provider and one local store.
///
/// The provider is chosen once at construction and never changes. Both
/// coordinators share the same [`LocalStore`], so anything stored by a
/// fallback upload is retrievable through [`PinningService::retrieve`].
pub struct PinningService {
    provider: Arc<dyn PinningProvider>,
    store: Arc<LocalStore>,
    uploads: UploadCoordinator,
    retrievals: RetrievalCoordinator,
}

impl PinningService {
    /// Build a service from configuration with the built-in providers.
    ///
    /// # Errors
    /// - The HTTP client cannot be created
    pub fn from_config(config: &PinningConfig) -> Result<Self> {
        Self::from_registry(&create_default_registry(), config)
    }

    /// Build a service resolving the provider through `registry`.
    pub fn from_registry(registry: &ProviderRegistry, config: &PinningConfig) -> Result<Self> {
        let provider = select_provider(registry, config)?;
        info!(
            configured = %config.provider,
            active = provider.name(),
            "Pinning service ready"
        );
        Ok(Self::with_provider(provider, Arc::new(LocalStore::new())))
    }

    /// Build a service over an explicit provider and store.
    pub fn with_provider(provider: Arc<dyn PinningProvider>, store: Arc<LocalStore>) -> Self {
        Self {
            uploads: UploadCoordinator::new(provider.clone(), store.clone()),
            retrievals: RetrievalCoordinator::new(provider.clone(), store.clone()),
            provider,
            store,
        }
    }

    /// Get the active provider name.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Get the shared local store.
    pub fn local_store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    /// Upload a document. Always yields an identifier.
    pub async fn upload(&self, document: &Document) -> ContentId {
        self.uploads.upload(document).await
    }

    /// Upload a document and report where it was stored.
    pub async fn upload_with_receipt(&self, document: &Document) -> UploadReceipt {
        self.uploads.upload_with_receipt(document).await
    }

    /// Retrieve a document, or `None` if no source has it.
    pub async fn retrieve(&self, id: &ContentId) -> Option<Document> {
        self.retrievals.retrieve(id).await
    }
}
