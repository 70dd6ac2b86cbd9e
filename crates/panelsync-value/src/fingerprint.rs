//! Content fingerprints
//!
//! Provides [`Fingerprint`], a 32-byte Blake3 digest of normalized JSON text.

use std::fmt::{self, Display, Formatter};

use serde_json::Value;

use crate::canonical::canonical_text;

/// A 32-byte Blake3 digest
///
/// Identifies a normalized payload in logs and drift reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash the canonical text of a JSON value
    #[inline]
    #[must_use]
    pub fn of_value(value: &Value) -> Self {
        Self::compute(canonical_text(value).as_bytes())
    }

    /// Raw digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
