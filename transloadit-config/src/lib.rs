//! Configuration management for Transloadit clients
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


use serde::Deserialize;
use thiserror::Error;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api2.transloadit.com";

/// Default signature lifetime in seconds
pub const DEFAULT_DURATION_SECS: u64 = 300;

/// Default connect timeout, and deadline for requests without uploads
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TransloaditConfig {
    /// Auth key from the account credentials page
    #[serde(default)]
    pub key: String,
    /// Auth secret; requests are unsigned when absent
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default)]
    pub max_size: Option<u64>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Digest used for request signatures (`sha1`, `sha256` or `sha384`)
    #[serde(default = "default_signature_algorithm")]
    pub signature_algorithm: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub log_level: Option<String>,
    /// `console` or `json`
    #[serde(default)]
    pub log_format: Option<String>,
}

fn default_duration_secs() -> u64 {
    DEFAULT_DURATION_SECS
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_signature_algorithm() -> String {
    "sha384".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl TransloaditConfig {
    /// Create a configuration for the given key with every other setting defaulted
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: None,
            duration_secs: DEFAULT_DURATION_SECS,
            max_size: None,
            endpoint: default_endpoint(),
            signature_algorithm: default_signature_algorithm(),
            timeout_secs: default_timeout_secs(),
            log_level: None,
            log_format: None,
        }
    }

    /// Set the auth secret
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Load configuration from `TRANSLOADIT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix("TRANSLOADIT"))
            .build()?;

        Self::from_config(source)
    }

    /// Build configuration from an already assembled `config::Config`
    pub fn from_config(source: config::Config) -> Result<Self, ConfigError> {
        let mut config: Self = source.try_deserialize()?;

        if config.key.is_empty() {
            return Err(ConfigError::Missing("key"));
        }

        // An empty secret means "unsigned", same as no secret at all
        if config.secret.as_deref().map_or(false, str::is_empty) {
            config.secret = None;
        }

        Ok(config)
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn log_format(&self) -> &str {
        self.log_format.as_deref().unwrap_or("console")
    }
}
