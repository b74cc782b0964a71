//! Shared HTTP plumbing for the pinning service clients.

use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use pinstore_common::{ContentId, Error, Result};

/// Filename of the multipart file part carrying the document.
pub const UPLOAD_FILENAME: &str = "data.json";

/// Characters escaped when an identifier is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// HTTP client bound to one provider name for error reporting.
#[derive(Debug, Clone)]
pub struct PinningHttp {
    client: Client,
    provider: &'static str,
}

impl PinningHttp {
    /// Create a client, optionally with a whole-request timeout.
    pub fn new(provider: &'static str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent("pinstore/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, provider })
    }

    #[cfg(test)]
    pub(crate) fn with_client(provider: &'static str, client: Client) -> Self {
        Self { client, provider }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Multipart form with the document as the `file` part.
    pub fn file_form(&self, data: Vec<u8>) -> Result<Form> {
        let part = Part::bytes(data)
            .file_name(UPLOAD_FILENAME)
            .mime_str("application/json")
            .map_err(|e| Error::InvalidInput(format!("Invalid part content type: {}", e)))?;
        Ok(Form::new().part("file", part))
    }

    /// Send a request and decode a JSON success body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} request failed: {}", self.provider, e)))?;

        let response = self.check_status(response).await?;
        response.json().await.map_err(|e| {
            Error::Serialization(format!("Failed to parse {} response: {}", self.provider, e))
        })
    }

    /// GET `url` and return the raw success body.
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        debug!(provider = self.provider, url = %url, "Fetching from gateway");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} gateway request failed: {}", self.provider, e)))?;

        let response = self.check_status(response).await?;
        response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read {} gateway body: {}", self.provider, e)))
    }

    /// Map non-success statuses onto the common error type.
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(Error::Authentication(format!(
                "{} rejected the credentials",
                self.provider
            )))
        } else if status == StatusCode::FORBIDDEN {
            Err(Error::PermissionDenied(format!("{} denied access", self.provider)))
        } else if status == StatusCode::NOT_FOUND {
            Err(Error::NotFound(format!("{}: {}", self.provider, response.url())))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Provider {
                provider: self.provider.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Turn an optional identifier field into a `ContentId`.
///
/// An absent or blank field fails the upload.
pub fn require_identifier(
    provider: &str,
    field: &'static str,
    value: Option<String>,
) -> Result<ContentId> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::MissingIdentifier {
            provider: provider.to_string(),
            field,
        })
        .and_then(ContentId::new)
}

/// `{base}/{id}` with the identifier escaped as a path segment.
pub fn join_gateway(base: &str, id: &ContentId) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        utf8_percent_encode(id.as_str(), PATH_SEGMENT)
    )
}
