//! Assembly steps
//!
//! A step runs one robot (`/image/resize`, `/video/encode`, ...) with
//! robot-specific options. Steps consume the previous step's output unless
//! `use` points them elsewhere.
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


use serde_json::{Map, Value};
use std::fmt;

/// Marker telling a step to process the originally uploaded files
pub const ORIGINAL_MARKER: &str = ":original";

/// Input source for [`Step::set_use`]
#[derive(Debug, Clone, Copy)]
pub enum StepInput<'a> {
    Original,
    Step(&'a Step),
    Steps(&'a [Step]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    name: String,
    robot: String,
    options: Map<String, Value>,
}

impl Step {
    pub fn new(name: impl Into<String>, robot: impl Into<String>) -> Self {
        Self::with_options(name, robot, Map::new())
    }

    pub fn with_options(
        name: impl Into<String>,
        robot: impl Into<String>,
        options: Map<String, Value>,
    ) -> Self {
        Self {
            name: name.into(),
            robot: robot.into(),
            options,
        }
    }

    /// Builder-style robot option
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn robot(&self) -> &str {
        &self.robot
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.options
    }

    /// Set or clear the `use` option
    ///
    /// `None` removes it, restoring the default of consuming the previous step.
    pub fn set_use(&mut self, input: Option<StepInput<'_>>) {
        let value = match input {
            None => {
                self.options.remove("use");
                return;
            }
            Some(StepInput::Original) => Value::from(ORIGINAL_MARKER),
            Some(StepInput::Step(step)) => Value::from(vec![step.name.clone()]),
            Some(StepInput::Steps(steps)) => {
                Value::from(steps.iter().map(|s| s.name.clone()).collect::<Vec<_>>())
            }
        };
        self.options.insert("use".to_string(), value);
    }

    /// Step body as sent to the API: the options plus `robot`
    pub fn to_value(&self) -> Value {
        let mut body = self.options.clone();
        body.insert("robot".to_string(), Value::from(self.robot.clone()));
        Value::Object(body)
    }

    /// `{ name: body }`
    pub fn to_hash(&self) -> Map<String, Value> {
        let mut hash = Map::new();
        hash.insert(self.name.clone(), self.to_value());
        hash
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
