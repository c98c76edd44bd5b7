//! Change tokens for conditional reads.
//!
//! A token is derived from the canonical serialization of a value and its
//! version with a 32-bit rolling hash (`h = h * 31 + byte`). It is only a
//! change-detection handle: equal inputs give equal tokens, and a new
//! version gives a new input. It is not a content hash and offers no
//! collision resistance.

use crate::Version;
use serde::{Deserialize, Serialize};

/// Opaque, equality-comparable change token (rendered as lowercase hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeToken(String);

impl ChangeToken {
    /// Derive the token for a serialized value at a given version.
    pub fn derive(serialized: &[u8], version: Version) -> Self {
        let suffix = version.to_string();
        let hash = serialized
            .iter()
            .chain(suffix.as_bytes())
            .fold(0i32, |hash, &byte| {
                hash.wrapping_mul(31).wrapping_add(i32::from(byte))
            });
        Self(format!("{:x}", hash.unsigned_abs()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a client-supplied entity tag (`"abc"`, `W/"abc"` or `abc`).
    pub fn from_header(value: &str) -> Self {
        let value = value.trim();
        let value = value.strip_prefix("W/").unwrap_or(value);
        Self(value.trim_matches('"').to_string())
    }

    /// Quoted form for an `ETag` header.
    pub fn to_header(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl From<&str> for ChangeToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ChangeToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ChangeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
