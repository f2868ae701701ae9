use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use sha2::Sha256;

/// Digest algorithms published by the upstream distribution APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Md5,
}

impl HashAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Md5 => "md5",
        }
    }

    /// Lowercase hex digest of `bytes`.
    pub fn digest_hex(self, bytes: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            HashAlgorithm::Md5 => hex::encode(Md5::digest(bytes)),
        }
    }
}

/// An expected digest for a fetched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedHash {
    pub algorithm: HashAlgorithm,
    pub value: String,
}

impl ExpectedHash {
    pub fn new(algorithm: HashAlgorithm, value: impl Into<String>) -> Self {
        Self {
            algorithm,
            value: value.into(),
        }
    }

    pub fn sha1(value: impl Into<String>) -> Self {
        Self::new(HashAlgorithm::Sha1, value)
    }

    /// Returns the actual digest when it differs from the expected one.
    pub fn mismatch(&self, bytes: &[u8]) -> Option<String> {
        let actual = self.algorithm.digest_hex(bytes);
        if actual.eq_ignore_ascii_case(self.value.trim()) {
            None
        } else {
            Some(actual)
        }
    }
}
