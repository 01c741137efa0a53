// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use async_trait::async_trait;
use av_transport::{HttpTransport, TransportError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GetJson,
    GetBytes,
    PostJson,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Json(Value),
    Bytes(Vec<u8>),
    Status(u16, String),
    Failure(String),
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<String, Scripted>,
    requests: Vec<RecordedRequest>,
}

/// Transport answering from a fixed script and recording every call.
/// Unscripted urls fail like an unreachable host.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn script(&self, url: &str, answer: Scripted) {
        self.lock().routes.insert(url.to_string(), answer);
    }

    pub fn on_get_json(&self, url: &str, value: Value) {
        self.script(url, Scripted::Json(value));
    }

    pub fn on_get_bytes(&self, url: &str, bytes: Vec<u8>) {
        self.script(url, Scripted::Bytes(bytes));
    }

    /// JSON answer for a POST to `url`.
    pub fn on_post_json(&self, url: &str, value: Value) {
        self.script(url, Scripted::Json(value));
    }

    pub fn on_status(&self, url: &str, status: u16, body: &str) {
        self.script(url, Scripted::Status(status, body.to_string()));
    }

    pub fn on_failure(&self, url: &str, message: &str) {
        self.script(url, Scripted::Failure(message.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn count(&self, method: HttpMethod) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    fn answer(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Scripted, TransportError> {
        let mut inner = self.lock();
        inner.requests.push(RecordedRequest {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });
        trace!(?method, url, "mock transport request");
        match inner.routes.get(url).cloned() {
            Some(Scripted::Status(status, body)) => Err(TransportError::Status {
                url: url.to_string(),
                status,
                body,
            }),
            Some(Scripted::Failure(message)) => Err(TransportError::request(url, message)),
            Some(answer) => Ok(answer),
            None => Err(TransportError::request(url, "no route to host")),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        match self.answer(HttpMethod::GetJson, url, None)? {
            Scripted::Json(value) => Ok(value),
            _ => Err(TransportError::body(url, "expected a JSON body")),
        }
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        match self.answer(HttpMethod::GetBytes, url, None)? {
            Scripted::Bytes(bytes) => Ok(bytes),
            Scripted::Json(value) => Ok(value.to_string().into_bytes()),
            _ => Err(TransportError::body(url, "expected a body")),
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        match self.answer(HttpMethod::PostJson, url, Some(body))? {
            Scripted::Json(value) => Ok(value),
            _ => Err(TransportError::body(url, "expected a JSON body")),
        }
    }
}
