//! Common types used throughout pinstore.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A JSON document as accepted by upload and returned by retrieval.
pub type Document = serde_json::Value;

/// Tag prepended to locally computed identifiers.
pub const LOCAL_SCHEME_TAG: &str = "Qm";

/// Number of hex digest characters kept in a local identifier.
pub const LOCAL_DIGEST_LEN: usize = 44;

/// Identifier addressing a stored document.
///
/// Either computed locally from the document bytes (`Qm` + 44 hex chars)
/// or assigned by a remote pinning provider, in which case it is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Create a new ContentId from a string.
    ///
    /// # Preconditions
    /// - `id` must be non-empty after trimming whitespace
    ///
    /// # Errors
    /// - Returns error if id is empty
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "ContentId cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Build a local-scheme identifier from a hex digest.
    ///
    /// Only the first [`LOCAL_DIGEST_LEN`] characters of the digest are kept.
    pub fn local(hex_digest: &str) -> Self {
        let mut id = String::with_capacity(LOCAL_SCHEME_TAG.len() + LOCAL_DIGEST_LEN);
        id.push_str(LOCAL_SCHEME_TAG);
        id.extend(hex_digest.chars().take(LOCAL_DIGEST_LEN));
        Self(id)
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier has the shape of a locally computed one.
    ///
    /// Remote CIDv0 identifiers also start with `Qm` but use base58, so the
    /// lowercase-hex check tells the two apart in practice.
    pub fn is_local_scheme(&self) -> bool {
        match self.0.strip_prefix(LOCAL_SCHEME_TAG) {
            Some(digest) => {
                digest.len() == LOCAL_DIGEST_LEN
                    && digest
                        .bytes()
                        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            }
            None => false,
        }
    }
}

impl TryFrom<String> for ContentId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ContentId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Credential wrapper that zeroizes on drop and never prints its value.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the credential for passing to a remote service.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}
