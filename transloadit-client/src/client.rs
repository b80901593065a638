//! Client entry point
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


use crate::assembly::{Assembly, AssemblyOptions};
use crate::credentials::Credentials;
use crate::error::{TransloaditError, TransloaditResult};
use crate::request::RequestClient;
use crate::signer::{DigestAlgorithm, Signer};
use crate::smart_cdn::{SmartCdnRequest, SmartCdnSigner};
use crate::step::Step;
use crate::template::TemplateApi;
use crate::transport::{ReqwestTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use transloadit_config::{TransloaditConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

/// Authenticated handle on the Transloadit API
#[derive(Debug, Clone)]
pub struct Transloadit {
    client: RequestClient,
}

impl Transloadit {
    /// Client for the default endpoint, signing with SHA-384 when a secret is given
    pub fn new(key: impl Into<String>, secret: Option<String>) -> TransloaditResult<Self> {
        let credentials = Credentials::new(key, secret)?;
        let transport = ReqwestTransport::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
        Self::with_transport(
            credentials,
            DEFAULT_ENDPOINT,
            Signer::default(),
            Arc::new(transport),
        )
    }

    pub fn from_config(config: &TransloaditConfig) -> TransloaditResult<Self> {
        let mut credentials = Credentials::new(config.key.clone(), config.secret.clone())?
            .with_duration_secs(config.duration_secs);
        if let Some(max_size) = config.max_size {
            credentials = credentials.with_max_size(max_size);
        }

        let algorithm: DigestAlgorithm = config.signature_algorithm.parse()?;
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;

        info!(
            endpoint = %config.endpoint,
            signed = credentials.secret().is_some(),
            algorithm = %algorithm,
            "Transloadit client configured"
        );

        Self::with_transport(
            credentials,
            &config.endpoint,
            Signer::new(algorithm),
            Arc::new(transport),
        )
    }

    pub fn with_transport(
        credentials: Credentials,
        endpoint: &str,
        signer: Signer,
        transport: Arc<dyn Transport>,
    ) -> TransloaditResult<Self> {
        let client = RequestClient::new(transport, endpoint, credentials, signer)?;
        Ok(Self { client })
    }

    pub fn credentials(&self) -> &Credentials {
        self.client.credentials()
    }

    pub fn request_client(&self) -> &RequestClient {
        &self.client
    }

    pub fn step(&self, name: impl Into<String>, robot: impl Into<String>) -> Step {
        Step::new(name, robot)
    }

    /// Fails early on duplicate step names
    pub fn assembly(&self, options: AssemblyOptions) -> TransloaditResult<Assembly> {
        Assembly::new(self.client.clone(), options)
    }

    pub fn templates(&self) -> TemplateApi {
        TemplateApi::new(self.client.clone())
    }

    /// Sign a Smart CDN URL with this client's key and secret
    pub fn signed_smart_cdn_url(&self, request: &SmartCdnRequest) -> TransloaditResult<String> {
        self.signed_smart_cdn_url_as(request, None, None)
    }

    /// Like [`Self::signed_smart_cdn_url`], with per-call key and secret overrides
    pub fn signed_smart_cdn_url_as(
        &self,
        request: &SmartCdnRequest,
        auth_key: Option<&str>,
        auth_secret: Option<&str>,
    ) -> TransloaditResult<String> {
        let credentials = self.client.credentials();
        let auth_key = auth_key.unwrap_or_else(|| credentials.key());
        let auth_secret = auth_secret
            .or_else(|| credentials.secret())
            .ok_or(TransloaditError::InvalidArgument("auth_secret"))?;

        SmartCdnSigner::new(auth_key, auth_secret).signed_url(request)
    }
}
