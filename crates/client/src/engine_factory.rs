// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::VoteError;
use av_config::{NetworkConfig, NetworkMode};
use av_engine::{FheEngine, RelayerEngine, SimulationCoprocessor, SimulationEngine};
use av_keys::KeyMaterial;
use av_transport::HttpTransport;
use std::sync::Arc;
use tracing::debug;

/// Builds the engine variant for a mode. Called once per operation with that
/// operation's key material; engines are never shared between calls.
#[derive(Clone)]
pub struct EngineFactory {
    network: NetworkConfig,
    transport: Arc<dyn HttpTransport>,
    coprocessor: Arc<SimulationCoprocessor>,
}

impl EngineFactory {
    pub fn new(
        network: NetworkConfig,
        transport: Arc<dyn HttpTransport>,
        coprocessor: Arc<SimulationCoprocessor>,
    ) -> Self {
        Self {
            network,
            transport,
            coprocessor,
        }
    }

    pub fn build(
        &self,
        mode: NetworkMode,
        material: &KeyMaterial,
    ) -> Result<Box<dyn FheEngine>, VoteError> {
        debug!(%mode, key = %material.public_key_id, "building engine");
        Ok(match mode {
            NetworkMode::Simulation => {
                Box::new(SimulationEngine::new(self.coprocessor.clone(), material)?)
            }
            NetworkMode::Live => Box::new(RelayerEngine::new(
                self.transport.clone(),
                &self.network,
                material,
            )?),
        })
    }
}
