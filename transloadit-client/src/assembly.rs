//! Assembly API
//!
//! An assembly is a processing job: a set of named steps (or a server-side
//! template) applied to the uploaded files. Creation retries when the API
//! answers with `RATE_LIMIT_REACHED`, waiting the server-provided `retryIn`
//! between attempts and re-opening every upload for the next attempt.
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
use crate::lifecycle::{sleep_or_cancel, AssemblyHandle};
use crate::request::{Attachments, RequestClient};
use crate::response::Response;
use crate::status::AssemblyStatusExt;
use crate::step::Step;
use crate::transport::FileField;
use crate::upload::Upload;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default number of creation attempts
pub const DEFAULT_TRIES: u32 = 3;

/// The shapes in which steps can be handed to an assembly
#[derive(Debug, Clone, PartialEq)]
pub enum Steps {
    /// Already in wire form (`name -> body`); passed through untouched
    Hash(Map<String, Value>),
    Single(Step),
    List(Vec<Step>),
}

impl From<Step> for Steps {
    fn from(step: Step) -> Self {
        Steps::Single(step)
    }
}

impl From<Vec<Step>> for Steps {
    fn from(steps: Vec<Step>) -> Self {
        Steps::List(steps)
    }
}

impl From<Map<String, Value>> for Steps {
    fn from(hash: Map<String, Value>) -> Self {
        Steps::Hash(hash)
    }
}

/// Normalize steps into the `name -> body` map sent to the API
///
/// Fails with `DuplicateStepName` when two listed steps share a name.
pub fn wrap_steps(steps: Option<&Steps>) -> TransloaditResult<Option<Map<String, Value>>> {
    let steps = match steps {
        None => return Ok(None),
        Some(steps) => steps,
    };

    match steps {
        Steps::Hash(hash) => Ok(Some(hash.clone())),
        Steps::Single(step) => Ok(Some(step.to_hash())),
        Steps::List(list) => {
            let mut seen = HashSet::new();
            let mut wrapped = Map::new();
            for step in list {
                if !seen.insert(step.name()) {
                    return Err(TransloaditError::DuplicateStepName(step.name().to_string()));
                }
                wrapped.insert(step.name().to_string(), step.to_value());
            }
            Ok(Some(wrapped))
        }
    }
}

/// Assembly instructions
#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    pub steps: Option<Steps>,
    pub template_id: Option<String>,
    pub notify_url: Option<String>,
    /// Sent inside `params.fields` and as plain form fields
    pub fields: Map<String, Value>,
    /// Creation attempts, `DEFAULT_TRIES` when unset
    pub tries: Option<u32>,
    /// Any other top-level params (`redirect_url`, ...)
    pub extra: Map<String, Value>,
}

impl AssemblyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(mut self, steps: impl Into<Steps>) -> Self {
        self.steps = Some(steps.into());
        self
    }

    pub fn template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn notify_url(mut self, notify_url: impl Into<String>) -> Self {
        self.notify_url = Some(notify_url.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// Per-call overrides for [`Assembly::create_with`]
#[derive(Debug, Clone, Default)]
pub struct CreateParams {
    /// Replaces the assembly's own steps for this submission
    pub steps: Option<Steps>,
    pub extra: Map<String, Value>,
}

/// Result of one creation attempt
#[derive(Debug)]
enum CreateOutcome {
    Success(Response),
    RateLimited(Response),
    Exhausted(Response),
}

fn classify(response: Response, attempt: u32, tries: u32) -> CreateOutcome {
    if !response.is_rate_limited() {
        CreateOutcome::Success(response)
    } else if attempt < tries {
        CreateOutcome::RateLimited(response)
    } else {
        CreateOutcome::Exhausted(response)
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Assembly {
    client: RequestClient,
    options: AssemblyOptions,
    steps: Option<Map<String, Value>>,
}

impl Assembly {
    /// Steps are validated here, not at submission time
    pub fn new(client: RequestClient, options: AssemblyOptions) -> TransloaditResult<Self> {
        let steps = wrap_steps(options.steps.as_ref())?;
        Ok(Self {
            client,
            options,
            steps,
        })
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Steps in wire form
    pub fn steps(&self) -> Option<&Map<String, Value>> {
        self.steps.as_ref()
    }

    /// Request params, without the `auth` block
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = self.options.extra.clone();

        if let Some(template_id) = &self.options.template_id {
            params.insert("template_id".to_string(), Value::from(template_id.clone()));
        }
        if let Some(notify_url) = &self.options.notify_url {
            params.insert("notify_url".to_string(), Value::from(notify_url.clone()));
        }
        if !self.options.fields.is_empty() {
            params.insert(
                "fields".to_string(),
                Value::Object(self.options.fields.clone()),
            );
        }
        if let Some(steps) = &self.steps {
            params.insert("steps".to_string(), Value::Object(steps.clone()));
        }

        params
    }

    pub fn tries(&self) -> u32 {
        self.options.tries.unwrap_or(DEFAULT_TRIES)
    }

    pub async fn create(&self, uploads: &[Upload]) -> TransloaditResult<AssemblyHandle> {
        self.create_with(uploads, CreateParams::default(), &CancellationToken::new())
            .await
    }

    /// Submit the assembly, retrying on rate limits
    ///
    /// Returns the first response that is not a rate limit. When the last
    /// allowed attempt is rate limited, fails with `RateLimitReached` carrying
    /// that response.
    pub async fn create_with(
        &self,
        uploads: &[Upload],
        overrides: CreateParams,
        cancel: &CancellationToken,
    ) -> TransloaditResult<AssemblyHandle> {
        let mut params = self.to_params();
        if let Some(steps) = wrap_steps(overrides.steps.as_ref())? {
            params.insert("steps".to_string(), Value::Object(steps));
        }
        params.extend(overrides.extra);

        // Zero tries would never submit anything
        let tries = self.tries().max(1);
        let mut attempt = 1;

        loop {
            let attachments = self.attachments(uploads).await?;
            debug!(attempt = attempt, tries = tries, files = uploads.len(), "Submitting assembly");

            let response = self
                .client
                .post("/assemblies", Some(params.clone()), attachments)
                .await?;

            match classify(response, attempt, tries) {
                CreateOutcome::Success(response) => {
                    info!(
                        assembly_id = response.get_str("assembly_id").unwrap_or_default(),
                        attempt = attempt,
                        "Assembly created"
                    );
                    return Ok(response.extend(self.client.clone()));
                }
                CreateOutcome::RateLimited(response) => {
                    let wait_time = response.wait_time();
                    warn!(
                        attempt = attempt,
                        tries = tries,
                        wait_time_secs = response.wait_time_secs(),
                        "Rate limit reached. Waiting for {} seconds before retrying.",
                        response.wait_time_secs()
                    );
                    sleep_or_cancel(wait_time, cancel).await?;
                    attempt += 1;
                }
                CreateOutcome::Exhausted(response) => {
                    warn!(tries = tries, "Rate limit reached and no tries left");
                    return Err(TransloaditError::RateLimitReached {
                        wait_time_secs: response.wait_time_secs(),
                        response: Box::new(response),
                    });
                }
            }
        }
    }

    /// Fields plus freshly opened `file_N` parts
    async fn attachments(&self, uploads: &[Upload]) -> TransloaditResult<Attachments> {
        let fields = self
            .options
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), field_text(value)))
            .collect();

        let mut files = Vec::with_capacity(uploads.len());
        for (index, upload) in uploads.iter().enumerate() {
            files.push(FileField {
                name: format!("file_{}", index),
                file_name: upload.file_name(),
                body: upload.open().await?,
            });
        }

        Ok(Attachments { fields, files })
    }

    pub async fn list(&self, params: Map<String, Value>) -> TransloaditResult<Response> {
        self.client.get("/assemblies", Some(params)).await
    }

    pub async fn get(&self, assembly_id: &str) -> TransloaditResult<AssemblyHandle> {
        let response = self
            .client
            .get(&format!("/assemblies/{}", assembly_id), None)
            .await?;
        Ok(response.extend(self.client.clone()))
    }

    /// Replay an assembly without waiting for it to finish
    pub async fn replay(
        &self,
        assembly_id: &str,
        mut params: Map<String, Value>,
    ) -> TransloaditResult<AssemblyHandle> {
        params.insert("wait".to_string(), Value::Bool(false));
        let response = self
            .client
            .post(
                &format!("/assemblies/{}/replay", assembly_id),
                Some(params),
                Attachments::default(),
            )
            .await?;
        Ok(response.extend(self.client.clone()))
    }

    pub async fn notifications(&self, params: Map<String, Value>) -> TransloaditResult<Response> {
        self.client.get("/assembly_notifications", Some(params)).await
    }

    pub async fn replay_notification(
        &self,
        assembly_id: &str,
        params: Map<String, Value>,
    ) -> TransloaditResult<Response> {
        self.client
            .post(
                &format!("/assembly_notifications/{}/replay", assembly_id),
                Some(params),
                Attachments::default(),
            )
            .await
    }
}
