//! Error types for the Transloadit client
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
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransloaditError {
    #[error("An authentication key must be provided")]
    MissingCredential,

    #[error("There are different Assembly steps using the same name: {0}")]
    DuplicateStepName(String),

    /// Raised once the create retry budget is spent; the last response is kept
    #[error("Transloadit rate limit reached. Retry in {wait_time_secs} seconds")]
    RateLimitReached {
        wait_time_secs: f64,
        response: Box<Response>,
    },

    #[error(
        "reload_until_finished reached its limit of {tries} tries. \
         This is not a rate limit and you may continue to poll for updates"
    )]
    ReloadLimitReached { tries: u32 },

    /// The transport produced no response at all
    #[error("HTTP transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("{0} is required")]
    InvalidArgument(&'static str),

    #[error("Response carries no assembly URL")]
    MissingAssemblyUrl,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TransloaditError {
    fn from(error: reqwest::Error) -> Self {
        TransloaditError::Transport(Box::new(error))
    }
}

pub type TransloaditResult<T> = Result<T, TransloaditError>;
