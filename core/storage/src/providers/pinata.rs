//! Pinata provider.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use pinstore_common::{ContentId, Error, PinningConfig, Result, Secret};

use super::http::{join_gateway, require_identifier, PinningHttp};
use crate::provider::PinningProvider;

const NAME: &str = "pinata";

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash", default)]
    ipfs_hash: Option<String>,
}

/// Pins through `pinFileToIPFS` using the key/secret header pair.
///
/// Pinata has no dedicated read path here; documents are fetched from the
/// configured gateway, which defaults to Pinata's public one.
pub struct PinataProvider {
    http: PinningHttp,
    api_url: String,
    gateway_url: String,
    api_key: Secret,
    api_secret: Option<Secret>,
}

impl PinataProvider {
    /// Create a new Pinata provider.
    ///
    /// # Errors
    /// - No API key configured
    pub fn new(config: &PinningConfig) -> Result<Self> {
        let api_key = config
            .pinata_api_key()
            .cloned()
            .ok_or_else(|| Error::InvalidInput("pinata requires an API key".to_string()))?;

        Ok(Self {
            http: PinningHttp::new(NAME, config.request_timeout())?,
            api_url: config.pinata_api_url.trim_end_matches('/').to_string(),
            gateway_url: config.gateway_url().to_string(),
            api_key,
            api_secret: config.pinata_api_secret.clone().filter(|s| !s.is_empty()),
        })
    }
}

#[async_trait]
impl PinningProvider for PinataProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn upload(&self, data: Vec<u8>) -> Result<ContentId> {
        let url = format!("{}/pinning/pinFileToIPFS", self.api_url);
        debug!(provider = NAME, url = %url, size = data.len(), "Uploading document");

        let mut request = self
            .http
            .client()
            .post(&url)
            .header("pinata_api_key", self.api_key.expose());
        if let Some(secret) = &self.api_secret {
            request = request.header("pinata_secret_api_key", secret.expose());
        }
        let request = request.multipart(self.http.file_form(data)?);

        let response: PinFileResponse = self.http.send_json(request).await?;
        require_identifier(NAME, "IpfsHash", response.ipfs_hash)
    }

    fn gateway_url(&self, id: &ContentId) -> String {
        join_gateway(&self.gateway_url, id)
    }

    async fn fetch(&self, id: &ContentId) -> Result<Bytes> {
        self.http.get_bytes(&self.gateway_url(id)).await
    }
}

/// Registry factory for the Pinata provider.
pub fn create_pinata_provider(config: &PinningConfig) -> Result<Arc<dyn PinningProvider>> {
    Ok(Arc::new(PinataProvider::new(config)?))
}
