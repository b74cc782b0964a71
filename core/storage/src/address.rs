//! Local content addressing.
//!
//! A local identifier is `"Qm"` followed by the first 44 lowercase hex
//! characters of the SHA-256 digest of the document's compact JSON form.
//! Object keys serialize in sorted order, so equal documents always yield
//! equal bytes and therefore equal identifiers.
//!
//! Serializers that keep insertion order (JavaScript's `JSON.stringify`, for
//! one) produce different bytes for multi-key objects such as
//! `{"b":2,"a":1}`, so their local identifiers are not interchangeable with
//! these.
//!
//! Two documents whose digests share the 44-character prefix map to the same
//! identifier; the later fallback write replaces the earlier one.

use sha2::{Digest, Sha256};

use pinstore_common::{ContentId, Document};

/// Computes deterministic identifiers for the fallback store.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentAddresser;

impl ContentAddresser {
    /// Compact JSON bytes of a document.
    pub fn canonical_bytes(document: &Document) -> Vec<u8> {
        document.to_string().into_bytes()
    }

    /// Identifier of a document.
    pub fn identify(document: &Document) -> ContentId {
        Self::identify_bytes(&Self::canonical_bytes(document))
    }

    /// Identifier of already-serialized document bytes.
    pub fn identify_bytes(bytes: &[u8]) -> ContentId {
        let digest = Sha256::digest(bytes);
        ContentId::local(&hex::encode(digest))
    }
}

/// Shorthand for [`ContentAddresser::identify`].
pub fn identify(document: &Document) -> ContentId {
    ContentAddresser::identify(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_known_vector() {
        // sha256('{"a":1}') = 015abd7f5cc57a2dd94b7590f04ad8084273905ee33ec5cebeae62276a97f862
        let id = identify(&json!({"a": 1}));
        assert_eq!(id.as_str(), "Qm015abd7f5cc57a2dd94b7590f04ad8084273905ee33e");
        assert!(id.is_local_scheme());
    }

    #[test]
    fn test_canonical_bytes_are_compact() {
        let bytes = ContentAddresser::canonical_bytes(&json!({"x": "y"}));
        assert_eq!(bytes, br#"{"x":"y"}"#);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let a: Document = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        let b: Document = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        assert_eq!(identify(&a), identify(&b));
        assert_eq!(identify(&a).as_str(), "Qm43258cff783fe7036d8a43033f830adfc60ec0373824");
    }

    #[test]
    fn test_distinct_fixtures_have_distinct_ids() {
        let fixtures = [
            json!({"a": 1}),
            json!({"a": 2}),
            json!({"v": 1}),
            json!({"x": "y"}),
            json!([1, 2, 3]),
            json!("a"),
            json!(null),
        ];
        let ids: std::collections::HashSet<_> = fixtures.iter().map(identify).collect();
        assert_eq!(ids.len(), fixtures.len());
    }

    #[test]
    fn test_identify_matches_identify_bytes() {
        let doc = json!({"nested": {"list": [true, false]}});
        let bytes = ContentAddresser::canonical_bytes(&doc);
        assert_eq!(identify(&doc), ContentAddresser::identify_bytes(&bytes));
    }

    proptest! {
        #[test]
        fn prop_identify_is_deterministic(key in "[a-z]{1,8}", value in any::<i64>()) {
            let mut map = serde_json::Map::new();
            map.insert(key, json!(value));
            let doc = Document::Object(map);
            prop_assert_eq!(identify(&doc), identify(&doc.clone()));
        }

        #[test]
        fn prop_identify_has_local_shape(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let id = ContentAddresser::identify_bytes(&bytes);
            prop_assert_eq!(id.as_str().len(), 46);
            prop_assert!(id.as_str().starts_with("Qm"));
            prop_assert!(id.is_local_scheme());
        }
    }
}
