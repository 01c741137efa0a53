// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{HttpTransport, TransportError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// [`HttpTransport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Per request timeout. Unset by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, TransportError> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::request(url, e))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "http response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        let response = self.send(url, self.client.get(url)).await?;
        response
            .json()
            .await
            .map_err(|e| TransportError::body(url, e))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self.send(url, self.client.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::body(url, e))?;
        Ok(bytes.to_vec())
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self.send(url, self.client.post(url).json(body)).await?;
        response
            .json()
            .await
            .map_err(|e| TransportError::body(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use serde_json::json;

    async fn serve() -> std::io::Result<String> {
        let server = HttpServer::new(|| {
            App::new()
                .route(
                    "/doc",
                    web::get().to(|| async { HttpResponse::Ok().json(json!({"ok": true})) }),
                )
                .route(
                    "/blob",
                    web::get().to(|| async { HttpResponse::Ok().body(vec![1u8, 2, 3]) }),
                )
                .route(
                    "/echo",
                    web::post().to(|body: web::Json<Value>| async move {
                        HttpResponse::Ok().json(json!({"echo": body.into_inner()}))
                    }),
                )
                .route(
                    "/gone",
                    web::get().to(|| async { HttpResponse::NotFound().body("no such key") }),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))?;
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        Ok(format!("http://{addr}"))
    }

    #[actix_web::test]
    async fn test_roundtrips_against_local_server() -> std::io::Result<()> {
        let base = serve().await?;
        let transport = ReqwestTransport::new().with_timeout(Duration::from_secs(5));

        let doc = transport.get_json(&format!("{base}/doc")).await.unwrap();
        assert_eq!(doc, json!({"ok": true}));

        let blob = transport.get_bytes(&format!("{base}/blob")).await.unwrap();
        assert_eq!(blob, vec![1, 2, 3]);

        let echo = transport
            .post_json(&format!("{base}/echo"), &json!({"a": 1}))
            .await
            .unwrap();
        assert_eq!(echo, json!({"echo": {"a": 1}}));

        let err = transport
            .get_bytes(&format!("{base}/gone"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(matches!(err, TransportError::Status { ref body, .. } if body == "no such key"));
        Ok(())
    }

    #[actix_web::test]
    async fn test_connection_refused_is_request_error() {
        let transport = ReqwestTransport::new();
        let err = transport
            .get_json("http://127.0.0.1:1/doc")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
        assert_eq!(err.status(), None);
    }
}
