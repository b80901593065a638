//! Account credentials and the `auth` block embedded in every request
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


use crate::error::{TransloaditError, TransloaditResult};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

pub use transloadit_config::DEFAULT_DURATION_SECS;

const EXPIRES_FORMAT: &str = "%Y/%m/%d %H:%M:%S+00:00";

/// `auth` sub-object of the request params
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthBlock {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

#[derive(Clone)]
pub struct Credentials {
    key: String,
    secret: Option<String>,
    duration_secs: u64,
    max_size: Option<u64>,
}

impl Credentials {
    /// Fails with `MissingCredential` when `key` is empty
    pub fn new(key: impl Into<String>, secret: Option<String>) -> TransloaditResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(TransloaditError::MissingCredential);
        }

        Ok(Self {
            key,
            secret: secret.filter(|s| !s.is_empty()),
            duration_secs: DEFAULT_DURATION_SECS,
            max_size: None,
        })
    }

    pub fn with_duration_secs(mut self, duration_secs: u64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `None` means requests go out unsigned
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }

    pub fn to_auth_block(&self) -> AuthBlock {
        self.auth_block_at(Utc::now())
    }

    /// Auth block with the expiry computed from `now`
    ///
    /// `expires` is only present when a secret is configured.
    pub fn auth_block_at(&self, now: DateTime<Utc>) -> AuthBlock {
        let expires = self.secret.as_ref().map(|_| {
            let secs = u32::try_from(self.duration_secs).unwrap_or(u32::MAX);
            let duration = Duration::seconds(i64::from(secs));
            now.checked_add_signed(duration)
                .unwrap_or(now)
                .format(EXPIRES_FORMAT)
                .to_string()
        });

        AuthBlock {
            key: self.key.clone(),
            expires,
            max_size: self.max_size,
        }
    }
}

// The secret must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("duration_secs", &self.duration_secs)
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_key_is_required() {
        assert!(matches!(
            Credentials::new("", Some("b".to_string())),
            Err(TransloaditError::MissingCredential)
        ));
    }

    #[test]
    fn test_key_only_defaults_duration() {
        let credentials = Credentials::new("a", None).unwrap();
        assert_eq!(credentials.duration_secs(), 300);
        assert!(credentials.secret().is_none());
    }

    #[test]
    fn test_auth_block_with_secret() {
        let credentials = Credentials::new("a", Some("b".to_string()))
            .unwrap()
            .with_duration_secs(10)
            .with_max_size(100);
        let now = Utc.with_ymd_and_hms(2024, 11, 25, 16, 4, 22).unwrap();

        let block = credentials.auth_block_at(now);

        assert_eq!(block.key, "a");
        assert_eq!(block.expires.as_deref(), Some("2024/11/25 16:04:32+00:00"));
        assert_eq!(block.max_size, Some(100));
    }

    #[test]
    fn test_auth_block_without_secret_has_no_expiry() {
        let credentials = Credentials::new("a", None).unwrap();
        let block = credentials.to_auth_block();

        assert!(block.expires.is_none());
        assert_eq!(
            serde_json::to_string(&block).unwrap(),
            r#"{"key":"a"}"#
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("a", Some("top-secret".to_string())).unwrap();
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("top-secret"));
    }
}
