//! Assembly status interpretation
//!
//! Every predicate reads the current body; nothing is cached, so the answers
//! track whatever response a handle holds after a reload.
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


use crate::response::Response;
use serde_json::Value;
use std::time::Duration;

pub const ASSEMBLY_UPLOADING: &str = "ASSEMBLY_UPLOADING";
pub const ASSEMBLY_EXECUTING: &str = "ASSEMBLY_EXECUTING";
pub const ASSEMBLY_REPLAYING: &str = "ASSEMBLY_REPLAYING";
pub const ASSEMBLY_COMPLETED: &str = "ASSEMBLY_COMPLETED";
pub const ASSEMBLY_CANCELED: &str = "ASSEMBLY_CANCELED";
pub const REQUEST_ABORTED: &str = "REQUEST_ABORTED";
pub const RATE_LIMIT_REACHED: &str = "RATE_LIMIT_REACHED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStatus {
    Uploading,
    Executing,
    Replaying,
    Completed,
    Canceled,
    Aborted,
    Error,
}

impl AssemblyStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            AssemblyStatus::Completed
                | AssemblyStatus::Canceled
                | AssemblyStatus::Aborted
                | AssemblyStatus::Error
        )
    }
}

/// Assembly lifecycle predicates over a response body
pub trait AssemblyStatusExt {
    fn response(&self) -> &Response;

    fn ok_token(&self) -> Option<&str> {
        self.response().get_str("ok")
    }

    fn is_uploading(&self) -> bool {
        self.ok_token() == Some(ASSEMBLY_UPLOADING)
    }

    fn is_executing(&self) -> bool {
        self.ok_token() == Some(ASSEMBLY_EXECUTING)
    }

    fn is_replaying(&self) -> bool {
        self.ok_token() == Some(ASSEMBLY_REPLAYING)
    }

    fn is_completed(&self) -> bool {
        self.ok_token() == Some(ASSEMBLY_COMPLETED)
    }

    fn is_canceled(&self) -> bool {
        self.ok_token() == Some(ASSEMBLY_CANCELED)
    }

    fn is_aborted(&self) -> bool {
        self.ok_token() == Some(REQUEST_ABORTED)
    }

    /// `error` present and non-null
    fn is_error(&self) -> bool {
        !matches!(self.response().get("error"), None | Some(Value::Null))
    }

    fn is_finished(&self) -> bool {
        self.is_aborted() || self.is_canceled() || self.is_completed() || self.is_error()
    }

    fn is_rate_limited(&self) -> bool {
        self.response().get_str("error") == Some(RATE_LIMIT_REACHED)
    }

    /// `info.retryIn` in seconds, 0 when absent
    fn wait_time_secs(&self) -> f64 {
        self.response()
            .body()
            .pointer("/info/retryIn")
            .and_then(Value::as_f64)
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .unwrap_or(0.0)
    }

    fn wait_time(&self) -> Duration {
        Duration::try_from_secs_f64(self.wait_time_secs()).unwrap_or(Duration::MAX)
    }

    /// Closed status derived from the `ok` / `error` tokens
    fn assembly_status(&self) -> Option<AssemblyStatus> {
        let status = match self.ok_token() {
            Some(ASSEMBLY_UPLOADING) => Some(AssemblyStatus::Uploading),
            Some(ASSEMBLY_EXECUTING) => Some(AssemblyStatus::Executing),
            Some(ASSEMBLY_REPLAYING) => Some(AssemblyStatus::Replaying),
            Some(ASSEMBLY_COMPLETED) => Some(AssemblyStatus::Completed),
            Some(ASSEMBLY_CANCELED) => Some(AssemblyStatus::Canceled),
            Some(REQUEST_ABORTED) => Some(AssemblyStatus::Aborted),
            _ => None,
        };

        status.or_else(|| self.is_error().then_some(AssemblyStatus::Error))
    }
}

impl AssemblyStatusExt for Response {
    fn response(&self) -> &Response {
        self
    }
}
