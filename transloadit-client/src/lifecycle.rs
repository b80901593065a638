//! Assembly handle: a response that knows how to refresh itself
//!
//! The handle owns one [`Response`] and swaps it for the latest server state on
//! `reload` and `cancel`. Callers keep a single handle across polls; calls on
//! one handle are expected to be sequential.
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
use crate::request::RequestClient;
use crate::response::{Response, ResponseRole};
use crate::status::AssemblyStatusExt;
use std::ops::Deref;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_RELOAD_TRIES: u32 = 600;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Sleep for `duration` unless `cancel` fires first
pub(crate) async fn sleep_or_cancel(
    duration: Duration,
    cancel: &CancellationToken,
) -> TransloaditResult<()> {
    tokio::select! {
        _ = cancel.cancelled() => Err(TransloaditError::Cancelled),
        _ = sleep(duration) => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyHandle {
    response: Response,
    client: RequestClient,
    poll_interval: Duration,
}

impl ResponseRole for AssemblyHandle {
    fn from_response(response: Response, client: RequestClient) -> Self {
        Self {
            response,
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl AssemblyStatusExt for AssemblyHandle {
    fn response(&self) -> &Response {
        &self.response
    }
}

impl Deref for AssemblyHandle {
    type Target = Response;

    fn deref(&self) -> &Response {
        &self.response
    }
}

impl AssemblyHandle {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn assembly_id(&self) -> Option<&str> {
        self.response.get_str("assembly_id")
    }

    /// The assembly's own status URL, as reported by the server
    pub fn assembly_url(&self) -> TransloaditResult<String> {
        self.response
            .get_str("assembly_url")
            .or_else(|| self.response.get_str("assembly_ssl_url"))
            .map(str::to_string)
            .ok_or(TransloaditError::MissingAssemblyUrl)
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    /// Fetch the current state and replace the held response with it
    pub async fn reload(&mut self) -> TransloaditResult<&Response> {
        let url = self.assembly_url()?;
        self.response = self.client.get(&url, None).await?;
        Ok(&self.response)
    }

    /// Cancel the assembly; the held response becomes the cancel reply
    pub async fn cancel(&mut self) -> TransloaditResult<&Response> {
        let url = self.assembly_url()?;
        info!(url = %url, "Canceling assembly");
        self.response = self.client.delete(&url, None).await?;
        Ok(&self.response)
    }

    pub async fn reload_until_finished(&mut self, tries: u32) -> TransloaditResult<&Response> {
        self.reload_until_finished_with(tries, &CancellationToken::new())
            .await
    }

    /// Poll until the assembly reaches a terminal state
    ///
    /// Each try waits one poll interval, then reloads. Running out of tries
    /// yields `ReloadLimitReached`; the handle stays valid and polling may
    /// resume.
    pub async fn reload_until_finished_with(
        &mut self,
        tries: u32,
        cancel: &CancellationToken,
    ) -> TransloaditResult<&Response> {
        for attempt in 1..=tries {
            sleep_or_cancel(self.poll_interval, cancel).await?;
            self.reload().await?;

            if self.is_finished() {
                info!(
                    assembly_id = self.assembly_id().unwrap_or_default(),
                    status = ?self.assembly_status(),
                    reloads = attempt,
                    "Assembly finished"
                );
                return Ok(&self.response);
            }

            debug!(
                attempt = attempt,
                tries = tries,
                status = ?self.assembly_status(),
                "Assembly still running"
            );
        }

        Err(TransloaditError::ReloadLimitReached { tries })
    }
}
