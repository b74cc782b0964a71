//! Provider registry and active provider selection.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use pinstore_common::{Error, PinningConfig, ProviderKind, Result};

use crate::provider::PinningProvider;
use crate::providers;

/// Factory function type for creating providers.
pub type ProviderFactory =
    Box<dyn Fn(&PinningConfig) -> Result<Arc<dyn PinningProvider>> + Send + Sync>;

/// Registry for pinning provider factories.
///
/// Allows registration and resolution of providers by name and
/// configuration.
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a provider factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: ProviderFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::AlreadyExists(format!(
                "Provider '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a provider by name and configuration.
    ///
    /// # Errors
    /// - Provider not found
    /// - Configuration lacks what the provider needs
    pub fn resolve(&self, name: &str, config: &PinningConfig) -> Result<Arc<dyn PinningProvider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Provider '{}' is not registered", name)))?;
        factory(config)
    }

    /// Get list of registered provider names, sorted.
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider is registered.
    pub fn has_provider(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in providers.
pub fn create_default_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    let builtins: [(ProviderKind, ProviderFactory); 4] = [
        (
            ProviderKind::Web3Storage,
            Box::new(providers::create_web3storage_provider),
        ),
        (ProviderKind::Pinata, Box::new(providers::create_pinata_provider)),
        (ProviderKind::Infura, Box::new(providers::create_infura_provider)),
        (ProviderKind::Local, Box::new(providers::create_daemon_provider)),
    ];
    for (kind, factory) in builtins {
        registry.factories.insert(kind.as_str().to_string(), factory);
    }
    registry
}

/// Build the active provider for `config`.
///
/// The configured provider is used when the registry can build it, which for
/// `web3storage` and `pinata` requires their credential. Anything else falls
/// through to the `local` daemon provider.
///
/// # Errors
/// - The `local` provider itself cannot be built
pub fn select_provider(
    registry: &ProviderRegistry,
    config: &PinningConfig,
) -> Result<Arc<dyn PinningProvider>> {
    let name = config.provider.as_str();
    let local = ProviderKind::Local.as_str();

    match registry.resolve(name, config) {
        Ok(provider) => Ok(provider),
        Err(err) if name != local => {
            debug!(provider = name, error = %err, "Provider unavailable, using local daemon");
            registry.resolve(local, config)
        }
        Err(err) => Err(err),
    }
}
