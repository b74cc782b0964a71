//! Retrieval coordination: local store first, then the provider gateway.

use std::sync::Arc;
use tracing::{debug, error};

use pinstore_common::{ContentId, Document};

use crate::local::LocalStore;
use crate::provider::PinningProvider;

/// Looks documents up by identifier. Absence is a normal outcome.
pub struct RetrievalCoordinator {
    provider: Arc<dyn PinningProvider>,
    store: Arc<LocalStore>,
}

impl RetrievalCoordinator {
    /// Create a coordinator over the active provider and a shared store.
    pub fn new(provider: Arc<dyn PinningProvider>, store: Arc<LocalStore>) -> Self {
        Self { provider, store }
    }

    /// Retrieve the document addressed by `id`.
    ///
    /// The local store always wins over the gateway, whatever the active
    /// provider. A failed gateway fetch checks the store once more before
    /// reporting `None`.
    pub async fn retrieve(&self, id: &ContentId) -> Option<Document> {
        if let Some(document) = self.store.get(id) {
            debug!(cid = %id, "Retrieved from local store");
            return Some(document);
        }

        match self.provider.fetch(id).await {
            Ok(body) => {
                debug!(provider = self.provider.name(), cid = %id, size = body.len(), "Retrieved from gateway");
                Some(interpret_body(&body))
            }
            Err(err) => {
                error!(
                    provider = self.provider.name(),
                    cid = %id,
                    error = %err,
                    "Gateway fetch failed"
                );
                self.store.get(id)
            }
        }
    }
}

/// JSON bodies become documents; anything else is kept as a JSON string.
fn interpret_body(body: &[u8]) -> Document {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Document::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::{CaptureLayer, ScriptedProvider};
    use serde_json::json;
    use tracing::Level;

    fn id(s: &str) -> ContentId {
        ContentId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_local_hit_skips_gateway() {
        let provider = Arc::new(ScriptedProvider::serving(br#"{"remote":true}"#));
        let store = Arc::new(LocalStore::new());
        store.insert(id("QmLocal"), json!({"local": true}));
        let coordinator = RetrievalCoordinator::new(provider.clone(), store);

        let document = coordinator.retrieve(&id("QmLocal")).await;

        assert_eq!(document, Some(json!({"local": true})));
        assert_eq!(provider.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_json_body() {
        let provider = Arc::new(ScriptedProvider::serving(br#"{"remote":true}"#));
        let coordinator = RetrievalCoordinator::new(provider.clone(), Arc::new(LocalStore::new()));

        let document = coordinator.retrieve(&id("QmRemote")).await;

        assert_eq!(document, Some(json!({"remote": true})));
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_gateway_non_json_body_is_a_string() {
        let provider = Arc::new(ScriptedProvider::serving(b"plain text"));
        let coordinator = RetrievalCoordinator::new(provider, Arc::new(LocalStore::new()));

        let document = coordinator.retrieve(&id("QmText")).await;

        assert_eq!(document, Some(json!("plain text")));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_absence() {
        let provider = Arc::new(ScriptedProvider::failing());
        let coordinator = RetrievalCoordinator::new(provider.clone(), Arc::new(LocalStore::new()));

        assert_eq!(coordinator.retrieve(&id("QmNowhere")).await, None);
        assert_eq!(provider.fetch_count(), 1, "no retries on fetch failure");
    }

    #[tokio::test]
    async fn test_gateway_failure_records_error() {
        let capture = CaptureLayer::default();
        let _guard = capture.install();
        let coordinator =
            RetrievalCoordinator::new(Arc::new(ScriptedProvider::failing()), Arc::new(LocalStore::new()));

        coordinator.retrieve(&id("QmNowhere")).await;

        let errors = capture.at_level(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].fields["provider"], "scripted");
        assert_eq!(errors[0].fields["cid"], "QmNowhere");
    }

    /// Writes the document locally mid-fetch, then fails the fetch.
    struct LateLocalWrite {
        store: Arc<LocalStore>,
    }

    #[async_trait::async_trait]
    impl PinningProvider for LateLocalWrite {
        fn name(&self) -> &str {
            "late"
        }

        async fn upload(&self, _data: Vec<u8>) -> pinstore_common::Result<ContentId> {
            Err(pinstore_common::Error::Network("unused".to_string()))
        }

        fn gateway_url(&self, id: &ContentId) -> String {
            format!("http://late.invalid/{}", id)
        }

        async fn fetch(&self, id: &ContentId) -> pinstore_common::Result<bytes::Bytes> {
            self.store.insert(id.clone(), json!({"late": true}));
            Err(pinstore_common::Error::Network("reset by peer".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_rechecks_local_store() {
        let store = Arc::new(LocalStore::new());
        let provider = Arc::new(LateLocalWrite { store: store.clone() });
        let coordinator = RetrievalCoordinator::new(provider, store);

        let document = coordinator.retrieve(&id("QmLate")).await;

        assert_eq!(document, Some(json!({"late": true})));
    }

    #[test]
    fn test_interpret_body() {
        assert_eq!(interpret_body(b"[1,2]"), json!([1, 2]));
        assert_eq!(interpret_body(b"42"), json!(42));
        assert_eq!(interpret_body(b"<html>"), json!("<html>"));
        assert_eq!(interpret_body(b""), json!(""));
    }
}
