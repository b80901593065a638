//! Uniform API response wrapper
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


use crate::request::RequestClient;
use crate::transport::HttpResponse;
use serde_json::Value;
use std::fmt;
use std::ops::Index;
use tracing::debug;

/// Behaviour layered onto a plain [`Response`] (assembly, template, ...)
pub trait ResponseRole: Sized {
    fn from_response(response: Response, client: RequestClient) -> Self;
}

/// Status, headers and parsed JSON body of one API call
///
/// Error statuses (413 rate limits included) are ordinary responses; only a
/// missing response is an error.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    raw_body: String,
    body: Value,
}

impl Response {
    pub fn from_http(http: HttpResponse) -> Self {
        let body = if http.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&http.body).unwrap_or_else(|e| {
                debug!(status = http.status, error = %e, "Response body is not JSON");
                Value::Null
            })
        };

        Self {
            status: http.status,
            headers: http.headers,
            raw_body: http.body,
            body,
        }
    }

    /// Response with a 200 status and the given JSON body
    pub fn from_json(body: Value) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            raw_body: body.to_string(),
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parsed body, `Null` when the body was empty or not JSON
    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn text(&self) -> &str {
        &self.raw_body
    }

    /// Top-level body attribute
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.body.get(attribute)
    }

    /// Top-level string attribute
    pub fn get_str(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).and_then(Value::as_str)
    }

    /// Attach role-specific behaviour without touching the transport types
    pub fn extend<R: ResponseRole>(self, client: RequestClient) -> R {
        R::from_response(self, client)
    }
}

impl Index<&str> for Response {
    type Output = Value;

    /// Missing attributes index to `Null`
    fn index(&self, attribute: &str) -> &Value {
        &self.body[attribute]
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}
