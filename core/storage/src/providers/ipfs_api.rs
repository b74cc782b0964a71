//! Providers speaking the IPFS HTTP API (`/add`): a local daemon and Infura.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use pinstore_common::{ContentId, PinningConfig, ProviderKind, Result};

use super::http::{join_gateway, require_identifier, PinningHttp};
use crate::provider::PinningProvider;

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash", default)]
    hash: Option<String>,
}

/// Uploads through `POST {api_url}/add?pin=true`.
///
/// The local daemon reads back through the configured gateway; Infura reads
/// back through its own public gateway.
pub struct IpfsApiProvider {
    name: &'static str,
    http: PinningHttp,
    api_url: String,
    gateway_url: String,
}

impl IpfsApiProvider {
    /// Provider for an IPFS daemon at `config.api_url`.
    pub fn daemon(config: &PinningConfig) -> Result<Self> {
        Self::build(ProviderKind::Local.as_str(), config, config.gateway_url())
    }

    /// Provider for Infura's IPFS API at `config.api_url`.
    pub fn infura(config: &PinningConfig) -> Result<Self> {
        Self::build(
            ProviderKind::Infura.as_str(),
            config,
            &config.infura_gateway_url,
        )
    }

    fn build(name: &'static str, config: &PinningConfig, gateway_url: &str) -> Result<Self> {
        Ok(Self {
            name,
            http: PinningHttp::new(name, config.request_timeout())?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            gateway_url: gateway_url.to_string(),
        })
    }
}

#[async_trait]
impl PinningProvider for IpfsApiProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn upload(&self, data: Vec<u8>) -> Result<ContentId> {
        let url = format!("{}/add", self.api_url);
        debug!(provider = self.name, url = %url, size = data.len(), "Uploading document");

        let request = self
            .http
            .client()
            .post(&url)
            .query(&[("pin", "true")])
            .multipart(self.http.file_form(data)?);

        let response: AddResponse = self.http.send_json(request).await?;
        require_identifier(self.name, "Hash", response.hash)
    }

    fn gateway_url(&self, id: &ContentId) -> String {
        join_gateway(&self.gateway_url, id)
    }

    async fn fetch(&self, id: &ContentId) -> Result<Bytes> {
        self.http.get_bytes(&self.gateway_url(id)).await
    }
}

/// Registry factory for the local daemon provider.
pub fn create_daemon_provider(config: &PinningConfig) -> Result<Arc<dyn PinningProvider>> {
    Ok(Arc::new(IpfsApiProvider::daemon(config)?))
}

/// Registry factory for the Infura provider.
pub fn create_infura_provider(config: &PinningConfig) -> Result<Arc<dyn PinningProvider>> {
    Ok(Arc::new(IpfsApiProvider::infura(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_uses_configured_gateway() {
        let config = PinningConfig::default().with_gateway_url("http://127.0.0.1:8080/ipfs");
        let provider = IpfsApiProvider::daemon(&config).unwrap();
        let id = ContentId::new("QmAbc").unwrap();

        assert_eq!(provider.name(), "local");
        assert_eq!(provider.gateway_url(&id), "http://127.0.0.1:8080/ipfs/QmAbc");
    }

    #[test]
    fn test_daemon_defaults_to_public_gateway() {
        let provider = IpfsApiProvider::daemon(&PinningConfig::default()).unwrap();
        let id = ContentId::new("QmAbc").unwrap();
        assert_eq!(provider.gateway_url(&id), "https://gateway.pinata.cloud/ipfs/QmAbc");
    }

    #[test]
    fn test_infura_ignores_generic_gateway() {
        let config = PinningConfig::new(ProviderKind::Infura).with_gateway_url("http://other/ipfs");
        let provider = IpfsApiProvider::infura(&config).unwrap();
        let id = ContentId::new("QmAbc").unwrap();

        assert_eq!(provider.name(), "infura");
        assert_eq!(provider.gateway_url(&id), "https://infura-ipfs.io/ipfs/QmAbc");
    }

    #[test]
    fn test_add_response_field_name() {
        let response: AddResponse =
            serde_json::from_str(r#"{"Name":"data.json","Hash":"QmAdded","Size":"9"}"#).unwrap();
        assert_eq!(response.hash.as_deref(), Some("QmAdded"));

        let response: AddResponse = serde_json::from_str(r#"{"Name":"data.json"}"#).unwrap();
        assert!(response.hash.is_none());
    }
}
