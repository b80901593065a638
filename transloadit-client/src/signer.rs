//! Request signing
//!
//! The API verifies every signed request by recomputing an HMAC over the exact
//! `params` JSON string it received. The digest is part of the wire contract and
//! is pinned through [`DigestAlgorithm`].
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::TransloaditError;
use ring::hmac;
use std::fmt;
use std::str::FromStr;

/// HMAC digest used for request signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    /// Legacy scheme; the signature is sent as bare hex
    Sha1,
    Sha256,
    #[default]
    Sha384,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
        }
    }

    fn hmac_algorithm(&self) -> hmac::Algorithm {
        match self {
            DigestAlgorithm::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            DigestAlgorithm::Sha256 => hmac::HMAC_SHA256,
            DigestAlgorithm::Sha384 => hmac::HMAC_SHA384,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = TransloaditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha384" => Ok(DigestAlgorithm::Sha384),
            other => Err(TransloaditError::Configuration(format!(
                "Unsupported signature algorithm: {}",
                other
            ))),
        }
    }
}

/// Hex encoded HMAC of `message` keyed with `key`
pub fn hmac_hex(algorithm: DigestAlgorithm, key: &str, message: &str) -> String {
    let key = hmac::Key::new(algorithm.hmac_algorithm(), key.as_bytes());
    hex::encode(hmac::sign(&key, message.as_bytes()).as_ref())
}

/// Stateless signer bound to one digest algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct Signer {
    algorithm: DigestAlgorithm,
}

impl Signer {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hex HMAC of `message`, or `None` when there is no secret to sign with
    pub fn sign(&self, secret: Option<&str>, message: &str) -> Option<String> {
        match secret {
            Some(secret) if !secret.is_empty() => Some(hmac_hex(self.algorithm, secret, message)),
            _ => None,
        }
    }

    /// Value of the `signature` form/query field
    pub fn signature_field(&self, secret: Option<&str>, message: &str) -> Option<String> {
        self.sign(secret, message).map(|digest| match self.algorithm {
            DigestAlgorithm::Sha1 => digest,
            algorithm => format!("{}:{}", algorithm, digest),
        })
    }
}
