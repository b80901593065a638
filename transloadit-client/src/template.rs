//! Template API
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
use crate::request::{Attachments, RequestClient};
use crate::response::{Response, ResponseRole};
use serde_json::{Map, Value};
use std::ops::Deref;

pub const TEMPLATE_CREATED: &str = "TEMPLATE_CREATED";

/// Server-side templates: stored assembly instructions
#[derive(Debug, Clone)]
pub struct TemplateApi {
    client: RequestClient,
}

impl TemplateApi {
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    /// `params` must carry `name` and `template`
    pub async fn create(&self, params: Map<String, Value>) -> TransloaditResult<TemplateHandle> {
        let response = self
            .client
            .post("/templates", Some(params), Attachments::default())
            .await?;
        Ok(response.extend(self.client.clone()))
    }

    pub async fn list(&self, params: Map<String, Value>) -> TransloaditResult<Response> {
        self.client.get("/templates", Some(params)).await
    }

    pub async fn get(
        &self,
        template_id: &str,
        params: Map<String, Value>,
    ) -> TransloaditResult<TemplateHandle> {
        let response = self
            .client
            .get(&format!("/templates/{}", template_id), Some(params))
            .await?;
        Ok(response.extend(self.client.clone()))
    }

    pub async fn update(
        &self,
        template_id: &str,
        params: Map<String, Value>,
    ) -> TransloaditResult<Response> {
        self.client
            .put(&format!("/templates/{}", template_id), Some(params))
            .await
    }

    pub async fn delete(
        &self,
        template_id: &str,
        params: Map<String, Value>,
    ) -> TransloaditResult<Response> {
        self.client
            .delete(&format!("/templates/{}", template_id), Some(params))
            .await
    }
}

/// Template response with update/delete bound to its `id`
#[derive(Debug, Clone)]
pub struct TemplateHandle {
    response: Response,
    client: RequestClient,
    template_id: Option<String>,
}

impl ResponseRole for TemplateHandle {
    fn from_response(response: Response, client: RequestClient) -> Self {
        let template_id = response.get_str("id").map(str::to_string);
        Self {
            response,
            client,
            template_id,
        }
    }
}

impl Deref for TemplateHandle {
    type Target = Response;

    fn deref(&self) -> &Response {
        &self.response
    }
}

impl TemplateHandle {
    pub fn is_created(&self) -> bool {
        self.response.get_str("ok") == Some(TEMPLATE_CREATED)
    }

    /// Template id, kept across replies that omit it
    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    fn require_id(&self) -> TransloaditResult<String> {
        self.template_id()
            .map(str::to_string)
            .ok_or_else(|| TransloaditError::Configuration("Template response has no id".to_string()))
    }

    /// Update the template and replace the held response with the reply
    pub async fn update(&mut self, params: Map<String, Value>) -> TransloaditResult<&Response> {
        let id = self.require_id()?;
        self.response = TemplateApi::new(self.client.clone()).update(&id, params).await?;
        if let Some(new_id) = self.response.get_str("id") {
            self.template_id = Some(new_id.to_string());
        }
        Ok(&self.response)
    }

    pub async fn delete(&mut self) -> TransloaditResult<&Response> {
        let id = self.require_id()?;
        self.response = TemplateApi::new(self.client.clone())
            .delete(&id, Map::new())
            .await?;
        Ok(&self.response)
    }
}
