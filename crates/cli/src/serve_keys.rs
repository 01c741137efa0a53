// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::Context;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::{bail, Result};
use av_config::{KeySource, NetworkConfig};
use av_keys::{fetch_from_keyurl, KeyError, RelayerKeysPayload};
use av_transport::HttpTransport;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Fetches the live key material on every request and answers it flattened.
#[derive(Clone)]
pub struct KeyProxy {
    transport: Arc<dyn HttpTransport>,
    keyurl: String,
    params_class: String,
}

impl KeyProxy {
    pub fn for_network(
        network: &NetworkConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let Some(KeySource::Keyurl { url }) = &network.key_source else {
            bail!("network '{}' has no keyurl key source", network.name);
        };
        Ok(Self {
            transport,
            keyurl: url.clone(),
            params_class: network.params_class.clone(),
        })
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/relayer-keys", web::get().to(relayer_keys))
        .route("/health", web::get().to(health));
}

async fn relayer_keys(proxy: web::Data<KeyProxy>) -> HttpResponse {
    let fetched =
        fetch_from_keyurl(proxy.transport.as_ref(), &proxy.keyurl, &proxy.params_class).await;
    match fetched {
        Ok(material) => HttpResponse::Ok()
            .insert_header(("Cache-Control", "no-store"))
            .json(RelayerKeysPayload::from(&material)),
        Err(KeyError::Transport(e)) => {
            warn!(error = %e, "key service unreachable");
            HttpResponse::BadGateway().json(json!({ "error": e.to_string() }))
        }
        Err(KeyError::Unavailable(reason)) => {
            warn!(%reason, "key service answered without key material");
            HttpResponse::InternalServerError().json(json!({ "error": reason }))
        }
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub async fn execute(context: &Context, host: &str, port: u16) -> Result<()> {
    let proxy = KeyProxy::for_network(&context.network, context.transport.clone())?;
    let bind_addr = format!("{host}:{port}");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(proxy.clone()))
            .wrap(Logger::default())
            .configure(routes)
    })
    .bind(&bind_addr)?;

    println!("Relayer key proxy listening on http://{bind_addr}/api/relayer-keys");
    server.run().await.map_err(Into::into)
}
