//! HTTP transport seam
//!
//! The request client only needs "send this request, give me status, headers
//! and body". [`ReqwestTransport`] is the production implementation; tests
//! plug in scripted transports.
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
use crate::upload::UploadBody;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use std::fmt;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Value of the `Transloadit-Client` header
pub const CLIENT_HEADER: &str = concat!("rust-sdk:", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        })
    }
}

/// File part of a multipart body
#[derive(Debug)]
pub struct FileField {
    pub name: String,
    pub file_name: String,
    pub body: UploadBody,
}

/// One body field; order in [`HttpRequest::form`] is the order on the wire
#[derive(Debug)]
pub enum FormPart {
    Text { name: String, value: String },
    File(FileField),
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } => name,
            FormPart::File(file) => &file.name,
        }
    }
}

#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<FormPart>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    /// Text value of the first body field called `name`
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_files(&self) -> bool {
        self.form.iter().any(|part| matches!(part, FormPart::File(_)))
    }
}

/// What came back from the server, whatever the status code
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Sends requests; must return `Err` only when no response was produced
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> TransloaditResult<HttpResponse>;
}

/// `reqwest` backed transport
///
/// `timeout` bounds connecting, and the whole exchange for requests without
/// file parts. Uploads are not capped, however long the body takes to stream.
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> TransloaditResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Transloadit-Client", HeaderValue::from_static(CLIENT_HEADER));

        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Overall deadline for `request`, `None` for uploads
    fn request_timeout(&self, request: &HttpRequest) -> Option<Duration> {
        (!request.has_files()).then_some(self.timeout)
    }

    fn file_part(file: FileField) -> TransloaditResult<Part> {
        let part = match file.body {
            UploadBody::File(handle) => {
                Part::stream(reqwest::Body::wrap_stream(ReaderStream::new(handle)))
            }
            UploadBody::Bytes(data) => Part::stream(data),
        };

        part.file_name(file.file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| TransloaditError::Configuration(format!("Invalid mime type: {}", e)))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> TransloaditResult<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self.client.request(method, &request.url);
        if let Some(timeout) = self.request_timeout(&request) {
            builder = builder.timeout(timeout);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if request.has_files() {
            let mut form = Form::new();
            for part in request.form {
                form = match part {
                    FormPart::Text { name, value } => form.text(name, value),
                    FormPart::File(file) => {
                        let name = file.name.clone();
                        form.part(name, Self::file_part(file)?)
                    }
                };
            }
            builder = builder.multipart(form);
        } else if !request.form.is_empty() {
            let pairs: Vec<(String, String)> = request
                .form
                .into_iter()
                .filter_map(|part| match part {
                    FormPart::Text { name, value } => Some((name, value)),
                    FormPart::File(_) => None,
                })
                .collect();
            builder = builder.form(&pairs);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.text().await?;

        debug!(status = status, bytes = body.len(), "Received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
