//! Pinning provider configuration.
//!
//! The configuration is read once and never mutated afterwards. It can be
//! deserialized from a JSON file, loaded from the process environment, or
//! built in code with the `with_*` setters.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::warn;

use crate::types::Secret;
use crate::{Error, Result};

/// Default IPFS HTTP API endpoint of a local daemon.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5001/api/v0";
/// Public gateway used when no override is configured.
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs";
pub const DEFAULT_WEB3STORAGE_API_URL: &str = "https://api.web3.storage";
pub const DEFAULT_WEB3STORAGE_GATEWAY_DOMAIN: &str = "ipfs.w3s.link";
pub const DEFAULT_WEB3STORAGE_GATEWAY_SCHEME: &str = "https";
pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_INFURA_GATEWAY_URL: &str = "https://infura-ipfs.io/ipfs";

/// Environment variables recognised by [`PinningConfig::from_env`].
pub mod env {
    pub const PROVIDER: &str = "IPFS_PROVIDER";
    pub const API_URL: &str = "IPFS_API_URL";
    pub const GATEWAY_URL: &str = "IPFS_GATEWAY_URL";
    pub const WEB3_STORAGE_TOKEN: &str = "WEB3_STORAGE_TOKEN";
    pub const PINATA_API_KEY: &str = "PINATA_API_KEY";
    pub const PINATA_API_SECRET: &str = "PINATA_API_SECRET";
}

/// The closed set of pinning providers.
///
/// Names outside the set resolve to [`ProviderKind::Local`], so a mistyped
/// provider still reaches the local daemon and its fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum ProviderKind {
    /// IPFS daemon reachable at `api_url`.
    #[default]
    Local,
    /// web3.storage upload API.
    Web3Storage,
    /// Pinata pinning API.
    Pinata,
    /// Infura IPFS API.
    Infura,
}

impl ProviderKind {
    /// All provider kinds, in selection order.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Web3Storage,
        ProviderKind::Pinata,
        ProviderKind::Infura,
        ProviderKind::Local,
    ];

    /// Registry name of this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Web3Storage => "web3storage",
            Self::Pinata => "pinata",
            Self::Infura => "infura",
        }
    }

    /// Look up a provider by name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Resolve a configured name, using the local daemon for unknown names.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!(provider = %name, "Unknown provider, using local daemon");
            Self::Local
        })
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ProviderKind {
    fn from(name: &str) -> Self {
        Self::resolve(name)
    }
}

impl From<String> for ProviderKind {
    fn from(name: String) -> Self {
        Self::resolve(&name)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_web3storage_api_url() -> String {
    DEFAULT_WEB3STORAGE_API_URL.to_string()
}

fn default_web3storage_gateway_domain() -> String {
    DEFAULT_WEB3STORAGE_GATEWAY_DOMAIN.to_string()
}

fn default_web3storage_gateway_scheme() -> String {
    DEFAULT_WEB3STORAGE_GATEWAY_SCHEME.to_string()
}

fn default_pinata_api_url() -> String {
    DEFAULT_PINATA_API_URL.to_string()
}

fn default_infura_gateway_url() -> String {
    DEFAULT_INFURA_GATEWAY_URL.to_string()
}

/// Provider selection and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PinningConfig {
    /// Active provider name.
    #[serde(default)]
    pub provider: ProviderKind,
    /// IPFS HTTP API endpoint for the local daemon and infura providers.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token for web3.storage.
    #[serde(default)]
    pub web3storage_token: Option<Secret>,
    /// Pinata API key.
    #[serde(default)]
    pub pinata_api_key: Option<Secret>,
    /// Pinata API secret.
    #[serde(default)]
    pub pinata_api_secret: Option<Secret>,
    /// Gateway override used for retrieval by pinata and the local daemon.
    #[serde(default)]
    pub gateway_url: Option<String>,
    #[serde(default = "default_web3storage_api_url")]
    pub web3storage_api_url: String,
    /// Subdomain gateway suffix, as in `https://{cid}.ipfs.w3s.link`.
    #[serde(default = "default_web3storage_gateway_domain")]
    pub web3storage_gateway_domain: String,
    /// Scheme of the subdomain gateway, `http` or `https`.
    #[serde(default = "default_web3storage_gateway_scheme")]
    pub web3storage_gateway_scheme: String,
    #[serde(default = "default_pinata_api_url")]
    pub pinata_api_url: String,
    #[serde(default = "default_infura_gateway_url")]
    pub infura_gateway_url: String,
    /// Transport timeout in seconds; absent means the HTTP client default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_url: default_api_url(),
            web3storage_token: None,
            pinata_api_key: None,
            pinata_api_secret: None,
            gateway_url: None,
            web3storage_api_url: default_web3storage_api_url(),
            web3storage_gateway_domain: default_web3storage_gateway_domain(),
            web3storage_gateway_scheme: default_web3storage_gateway_scheme(),
            pinata_api_url: default_pinata_api_url(),
            infura_gateway_url: default_infura_gateway_url(),
            request_timeout_secs: None,
        }
    }
}

impl PinningConfig {
    /// Create a configuration for the given provider with all defaults.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// - Malformed URL
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(provider) = get(env::PROVIDER) {
            config.provider = ProviderKind::resolve(&provider);
        }
        if let Some(api_url) = get(env::API_URL) {
            config.api_url = api_url;
        }
        config.gateway_url = get(env::GATEWAY_URL);
        config.web3storage_token = get(env::WEB3_STORAGE_TOKEN).map(Secret::new);
        config.pinata_api_key = get(env::PINATA_API_KEY).map(Secret::new);
        config.pinata_api_secret = get(env::PINATA_API_SECRET).map(Secret::new);

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid pinning config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every configured endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        check_url("api_url", &self.api_url)?;
        check_url("web3storage_api_url", &self.web3storage_api_url)?;
        check_url("pinata_api_url", &self.pinata_api_url)?;
        check_url("infura_gateway_url", &self.infura_gateway_url)?;
        if let Some(gateway) = &self.gateway_url {
            check_url("gateway_url", gateway)?;
        }
        if !matches!(self.web3storage_gateway_scheme.as_str(), "http" | "https") {
            return Err(Error::Config(format!(
                "web3storage_gateway_scheme must be http or https, got '{}'",
                self.web3storage_gateway_scheme
            )));
        }
        if self.web3storage_gateway_domain.trim().is_empty()
            || self.web3storage_gateway_domain.contains('/')
        {
            return Err(Error::Config(format!(
                "web3storage_gateway_domain must be a bare host name, got '{}'",
                self.web3storage_gateway_domain
            )));
        }
        Ok(())
    }

    /// Web3.Storage token, if configured and non-empty.
    pub fn web3storage_token(&self) -> Option<&Secret> {
        self.web3storage_token.as_ref().filter(|s| !s.is_empty())
    }

    /// Pinata API key, if configured and non-empty.
    pub fn pinata_api_key(&self) -> Option<&Secret> {
        self.pinata_api_key.as_ref().filter(|s| !s.is_empty())
    }

    /// Gateway used by providers without a dedicated one.
    pub fn gateway_url(&self) -> &str {
        self.gateway_url.as_deref().unwrap_or(DEFAULT_GATEWAY_URL)
    }

    /// Transport timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    pub fn with_web3storage_token(mut self, token: impl Into<String>) -> Self {
        self.web3storage_token = Some(Secret::new(token));
        self
    }

    pub fn with_pinata_keys(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.pinata_api_key = Some(Secret::new(key));
        self.pinata_api_secret = Some(Secret::new(secret));
        self
    }

    pub fn with_web3storage_api_url(mut self, url: impl Into<String>) -> Self {
        self.web3storage_api_url = url.into();
        self
    }

    /// Subdomain gateway serving `{scheme}://{cid}.{domain}`.
    pub fn with_web3storage_gateway(
        mut self,
        scheme: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        self.web3storage_gateway_scheme = scheme.into();
        self.web3storage_gateway_domain = domain.into();
        self
    }

    pub fn with_pinata_api_url(mut self, url: impl Into<String>) -> Self {
        self.pinata_api_url = url.into();
        self
    }

    pub fn with_infura_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.infura_gateway_url = url.into();
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }
}

fn check_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::Config(format!("{} is not a valid URL ('{}'): {}", field, value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}
