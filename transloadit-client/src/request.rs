//! Signed requests against the Transloadit REST API
//!
//! Every call carries its parameters as one JSON string (`params`) holding the
//! `auth` block, plus an HMAC `signature` of that exact string when a secret is
//! configured. GET and DELETE send both as query values. POST and PUT send them
//! as the first two body fields so the server can validate the request before
//! any file bytes arrive; extra fields and files follow.
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


use crate::credentials::Credentials;
use crate::error::{TransloaditError, TransloaditResult};
use crate::response::Response;
use crate::signer::Signer;
use crate::transport::{FileField, FormPart, HttpMethod, HttpRequest, Transport};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Canonical payload: the `params` JSON and its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub params_json: String,
    /// Absent when unsigned; never an empty string
    pub signature: Option<String>,
}

/// Body fields that follow `params` and `signature`
#[derive(Debug, Default)]
pub struct Attachments {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FileField>,
}

#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    credentials: Credentials,
    signer: Signer,
}

impl RequestClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: &str,
        credentials: Credentials,
        signer: Signer,
    ) -> TransloaditResult<Self> {
        let mut base_url = Url::parse(endpoint).map_err(|e| {
            TransloaditError::Configuration(format!("Invalid endpoint {}: {}", endpoint, e))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            transport,
            base_url,
            credentials,
            signer,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn signer(&self) -> Signer {
        self.signer
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URLs pass through, paths are joined onto the endpoint
    pub fn resolve_url(&self, path: &str) -> TransloaditResult<String> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url.into());
        }

        self.base_url
            .join(path.trim_start_matches('/'))
            .map(Into::into)
            .map_err(|e| TransloaditError::Configuration(format!("Invalid path {}: {}", path, e)))
    }

    /// Merge `params` over the `auth` block, serialize and sign
    pub fn envelope(&self, params: Map<String, Value>) -> TransloaditResult<SignedEnvelope> {
        let mut merged = Map::new();
        merged.insert(
            "auth".to_string(),
            serde_json::to_value(self.credentials.to_auth_block())?,
        );
        merged.extend(params);

        let params_json = serde_json::to_string(&Value::Object(merged))?;
        let signature = self
            .signer
            .signature_field(self.credentials.secret(), &params_json);

        Ok(SignedEnvelope {
            params_json,
            signature,
        })
    }

    /// `None` sends no params at all (no auth either)
    pub async fn get(
        &self,
        path: &str,
        params: Option<Map<String, Value>>,
    ) -> TransloaditResult<Response> {
        let request = self.query_request(HttpMethod::Get, path, params)?;
        self.execute(request).await
    }

    pub async fn delete(
        &self,
        path: &str,
        params: Option<Map<String, Value>>,
    ) -> TransloaditResult<Response> {
        let request = self.query_request(HttpMethod::Delete, path, params)?;
        self.execute(request).await
    }

    pub async fn post(
        &self,
        path: &str,
        params: Option<Map<String, Value>>,
        attachments: Attachments,
    ) -> TransloaditResult<Response> {
        let request = self.form_request(HttpMethod::Post, path, params, attachments)?;
        self.execute(request).await
    }

    pub async fn put(
        &self,
        path: &str,
        params: Option<Map<String, Value>>,
    ) -> TransloaditResult<Response> {
        let request = self.form_request(HttpMethod::Put, path, params, Attachments::default())?;
        self.execute(request).await
    }

    fn query_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<Map<String, Value>>,
    ) -> TransloaditResult<HttpRequest> {
        let mut request = HttpRequest::new(method, self.resolve_url(path)?);

        if let Some(params) = params {
            let envelope = self.envelope(params)?;
            request.query.push(("params".to_string(), envelope.params_json));
            if let Some(signature) = envelope.signature {
                request.query.push(("signature".to_string(), signature));
            }
        }

        Ok(request)
    }

    fn form_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<Map<String, Value>>,
        attachments: Attachments,
    ) -> TransloaditResult<HttpRequest> {
        let mut request = HttpRequest::new(method, self.resolve_url(path)?);

        // params and signature go first, ahead of any file data
        if let Some(params) = params {
            let envelope = self.envelope(params)?;
            request.form.push(FormPart::text("params", envelope.params_json));
            if let Some(signature) = envelope.signature {
                request.form.push(FormPart::text("signature", signature));
            }
        }

        request.form.extend(
            attachments
                .fields
                .into_iter()
                .map(|(name, value)| FormPart::text(name, value)),
        );
        request
            .form
            .extend(attachments.files.into_iter().map(FormPart::File));

        Ok(request)
    }

    async fn execute(&self, request: HttpRequest) -> TransloaditResult<Response> {
        let method = request.method;
        let url = request.url.clone();

        let http = self.transport.send(request).await?;

        debug!(
            method = %method,
            url = %url,
            status = http.status,
            "Transloadit API call completed"
        );

        Ok(Response::from_http(http))
    }
}

impl fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .field("signer", &self.signer)
            .finish()
    }
}
