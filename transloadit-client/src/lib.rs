//! Transloadit client
//!
//! Async client for the Transloadit media processing API:
//! - Signed requests (canonical `params` JSON + HMAC signature)
//! - Assembly creation with rate-limit aware retries
//! - Polling assemblies to completion, with cooperative cancellation
//! - Template management
//! - Smart CDN URL signing
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


pub mod assembly;
pub mod client;
pub mod credentials;
pub mod error;
pub mod lifecycle;
pub mod request;
pub mod response;
pub mod signer;
pub mod smart_cdn;
pub mod status;
pub mod step;
pub mod template;
pub mod transport;
pub mod upload;

pub use assembly::{Assembly, AssemblyOptions, CreateParams, Steps};
pub use client::Transloadit;
pub use credentials::{AuthBlock, Credentials};
pub use error::{TransloaditError, TransloaditResult};
pub use lifecycle::AssemblyHandle;
pub use request::{RequestClient, SignedEnvelope};
pub use response::{Response, ResponseRole};
pub use signer::{DigestAlgorithm, Signer};
pub use smart_cdn::{SmartCdnRequest, SmartCdnSigner, UrlParam};
pub use status::{AssemblyStatus, AssemblyStatusExt};
pub use step::{Step, StepInput};
pub use template::{TemplateApi, TemplateHandle};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use upload::Upload;

// Cancellation handle for `create_with` and `reload_until_finished_with`
pub use tokio_util::sync::CancellationToken;
