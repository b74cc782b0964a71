//! web3.storage provider.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use pinstore_common::{ContentId, Error, PinningConfig, Result, Secret};

use super::http::{require_identifier, PinningHttp};
use crate::provider::PinningProvider;

const NAME: &str = "web3storage";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    cid: Option<String>,
}

/// Uploads through `POST {api}/upload` with a bearer token and reads back
/// from the `{scheme}://{cid}.{domain}` subdomain gateway.
pub struct Web3StorageProvider {
    http: PinningHttp,
    api_url: String,
    gateway_scheme: String,
    gateway_domain: String,
    token: Secret,
}

impl Web3StorageProvider {
    /// Create a new web3.storage provider.
    ///
    /// # Errors
    /// - No token configured
    pub fn new(config: &PinningConfig) -> Result<Self> {
        let token = config
            .web3storage_token()
            .cloned()
            .ok_or_else(|| Error::InvalidInput("web3storage requires a token".to_string()))?;

        Ok(Self {
            http: PinningHttp::new(NAME, config.request_timeout())?,
            api_url: config.web3storage_api_url.trim_end_matches('/').to_string(),
            gateway_scheme: config.web3storage_gateway_scheme.clone(),
            gateway_domain: config.web3storage_gateway_domain.clone(),
            token,
        })
    }
}

#[async_trait]
impl PinningProvider for Web3StorageProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn upload(&self, data: Vec<u8>) -> Result<ContentId> {
        let url = format!("{}/upload", self.api_url);
        debug!(provider = NAME, url = %url, size = data.len(), "Uploading document");

        let request = self
            .http
            .client()
            .post(&url)
            .bearer_auth(self.token.expose())
            .multipart(self.http.file_form(data)?);

        let response: UploadResponse = self.http.send_json(request).await?;
        require_identifier(NAME, "cid", response.cid)
    }

    fn gateway_url(&self, id: &ContentId) -> String {
        format!("{}://{}.{}", self.gateway_scheme, id, self.gateway_domain)
    }

    async fn fetch(&self, id: &ContentId) -> Result<Bytes> {
        check_host_label(id)?;
        self.http.get_bytes(&self.gateway_url(id)).await
    }
}

/// The identifier becomes a DNS label of the gateway host.
fn check_host_label(id: &ContentId) -> Result<()> {
    let label = id.as_str();
    let valid = (1..=63).contains(&label.len())
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "'{}' cannot be used as a gateway subdomain",
            label
        )))
    }
}

/// Registry factory for the web3.storage provider.
pub fn create_web3storage_provider(config: &PinningConfig) -> Result<Arc<dyn PinningProvider>> {
    Ok(Arc::new(Web3StorageProvider::new(config)?))
}
