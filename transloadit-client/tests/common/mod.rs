//! Scripted transport for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use transloadit_client::transport::{FormPart, HttpMethod};
use transloadit_client::{
    Credentials, HttpRequest, HttpResponse, RequestClient, Signer, Transloadit, TransloaditError,
    TransloaditResult, Transport,
};

pub const ENDPOINT: &str = "https://api2.transloadit.com";

/// What the transport saw, minus file bodies
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    /// `(name, text value)`; file parts carry their file name instead
    pub form: Vec<(String, String)>,
}

impl Recorded {
    pub fn form_names(&self) -> Vec<&str> {
        self.form.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Decoded `params` from either the query or the body
    pub fn params(&self) -> Value {
        let raw = self
            .query_value("params")
            .or_else(|| self.form_value("params"))
            .expect("request carries no params");
        serde_json::from_str(raw).expect("params is not JSON")
    }
}

/// Replies from a queue and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<TransloaditResult<HttpResponse>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: Value) {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransloaditError::Transport(message.to_string().into())));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> TransloaditResult<HttpResponse> {
        let form = request
            .form
            .iter()
            .map(|part| match part {
                FormPart::Text { name, value } => (name.clone(), value.clone()),
                FormPart::File(file) => (file.name.clone(), file.file_name.clone()),
            })
            .collect();

        self.requests.lock().unwrap().push(Recorded {
            method: request.method,
            url: request.url.clone(),
            query: request.query.clone(),
            form,
        });

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransloaditError::Transport("no scripted reply left".into())))
    }
}

pub fn transloadit(transport: Arc<ScriptedTransport>, secret: Option<&str>) -> Transloadit {
    let credentials = Credentials::new("my-key", secret.map(str::to_string)).unwrap();
    Transloadit::with_transport(credentials, ENDPOINT, Signer::default(), transport).unwrap()
}

pub fn request_client(transport: Arc<ScriptedTransport>, secret: Option<&str>) -> RequestClient {
    transloadit(transport, secret).request_client().clone()
}
