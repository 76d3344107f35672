// SPDX-License-Identifier: MIT
//! SHA-256 digests of supplementary file contents

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid content hash {value:?}: {reason}")]
pub struct InvalidHash {
    pub value: String,
    pub reason: &'static str,
}

/// SHA-256 content hash (32 bytes = 64 lowercase hex chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn of(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Create from a hex string; upper case digits are accepted and normalised
    pub fn from_hex(value: &str) -> Result<Self, InvalidHash> {
        if value.len() != 64 {
            return Err(InvalidHash {
                value: value.to_string(),
                reason: "expected 64 hex characters",
            });
        }
        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidHash {
                value: value.to_string(),
                reason: "hex characters only",
            });
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = InvalidHash;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_known_vector() {
        assert_eq!(
            ContentHash::of(b"abc").as_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_from_hex_normalises_case() {
        let upper = "A".repeat(64);
        let hash = ContentHash::from_hex(&upper).unwrap();
        assert_eq!(hash.as_hex(), "a".repeat(64));
    }

    #[test]
    fn test_from_hex_invalid() {
        assert_eq!(
            ContentHash::from_hex(&"a".repeat(63)).unwrap_err().reason,
            "expected 64 hex characters"
        );
        assert_eq!(
            "g".repeat(64).parse::<ContentHash>().unwrap_err().reason,
            "hex characters only"
        );
    }

    #[test]
    fn test_display() {
        let hash = ContentHash::of(b"");
        assert_eq!(hash.to_string(), hash.as_hex());
    }
}
