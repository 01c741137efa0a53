// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! The HTTP seam. Key provisioning and the relayer engine only ever talk to
//! the outside world through [`HttpTransport`], so tests can script responses.

mod error;
mod reqwest_transport;

pub use error::TransportError;
pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET a JSON document. Non success statuses are errors.
    async fn get_json(&self, url: &str) -> Result<Value, TransportError>;

    /// GET a raw body. Non success statuses are errors.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError>;

    /// POST a JSON body and read a JSON answer. Non success statuses are errors.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}
