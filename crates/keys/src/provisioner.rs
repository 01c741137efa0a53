// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::document::{KeyUrlDocument, RelayerKeysPayload};
use crate::{KeyError, KeyMaterial};
use av_config::{KeySource, NetworkConfig, NetworkMode, SimulationFixture};
use av_transport::{HttpTransport, TransportError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Live key source of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveKeySource {
    pub source: KeySource,
    pub params_class: String,
}

impl LiveKeySource {
    pub fn from_network(network: &NetworkConfig) -> Option<Self> {
        network.key_source.clone().map(|source| Self {
            source,
            params_class: network.params_class.clone(),
        })
    }
}

/// Obtains the FHE public key and public parameters for the active mode.
#[derive(Clone)]
pub struct KeyProvisioner {
    transport: Arc<dyn HttpTransport>,
    fixture: SimulationFixture,
    live: Option<LiveKeySource>,
}

impl KeyProvisioner {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        fixture: SimulationFixture,
        live: Option<LiveKeySource>,
    ) -> Self {
        Self {
            transport,
            fixture,
            live,
        }
    }

    pub fn for_network(
        transport: Arc<dyn HttpTransport>,
        fixture: SimulationFixture,
        network: &NetworkConfig,
    ) -> Self {
        Self::new(transport, fixture, LiveKeySource::from_network(network))
    }

    #[instrument(skip(self))]
    pub async fn fetch_key_material(&self, mode: NetworkMode) -> Result<KeyMaterial, KeyError> {
        match mode {
            NetworkMode::Simulation => {
                debug!(chain_id = self.fixture.chain_id, "using simulation key material");
                Ok(KeyMaterial::simulation(&self.fixture))
            }
            NetworkMode::Live => {
                let live = self
                    .live
                    .as_ref()
                    .ok_or_else(|| KeyError::unavailable("no live key source configured"))?;
                let material = match &live.source {
                    KeySource::Keyurl { url } => {
                        fetch_from_keyurl(self.transport.as_ref(), url, &live.params_class).await?
                    }
                    KeySource::Proxy { url } => {
                        fetch_from_proxy(self.transport.as_ref(), url).await?
                    }
                };
                info!(
                    public_key_id = %material.public_key_id,
                    public_params_id = %material.public_params_id,
                    "fetched key material"
                );
                Ok(material)
            }
        }
    }
}

/// Reads the key url document, then downloads the key and the parameters
/// side by side. Descriptors are validated before either download starts.
pub async fn fetch_from_keyurl(
    transport: &dyn HttpTransport,
    url: &str,
    params_class: &str,
) -> Result<KeyMaterial, KeyError> {
    let document = KeyUrlDocument::from_value(transport.get_json(url).await?)?;
    let descriptors = document.descriptors(params_class)?;
    debug!(
        public_key_url = %descriptors.public_key.url,
        public_params_url = %descriptors.public_params.url,
        "downloading key material"
    );

    let (public_key, public_params) = futures::try_join!(
        transport.get_bytes(&descriptors.public_key.url),
        transport.get_bytes(&descriptors.public_params.url),
    )?;

    Ok(KeyMaterial {
        public_key_id: descriptors.public_key.id,
        public_key,
        public_params_id: descriptors.public_params.id,
        public_params,
    })
}

pub async fn fetch_from_proxy(
    transport: &dyn HttpTransport,
    url: &str,
) -> Result<KeyMaterial, KeyError> {
    let payload = transport.get_json(url).await.map_err(proxy_error)?;
    RelayerKeysPayload::from_value(payload)?.into_key_material()
}

/// The proxy answers 500 with an `{error}` body when the upstream document
/// lacks key material. Anything else is a transport failure.
fn proxy_error(e: TransportError) -> KeyError {
    if let TransportError::Status {
        status: 500, body, ..
    } = &e
    {
        let reason = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error")?.as_str().map(str::to_owned));
        if let Some(reason) = reason {
            return KeyError::Unavailable(reason);
        }
    }
    KeyError::Transport(e)
}
