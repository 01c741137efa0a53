// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod coprocessor;

pub use coprocessor::{unix_now, SimulationCoprocessor};

use crate::traits::Lanes;
use crate::{
    AuthorizationMessage, CipherBundle, ClearValue, EncryptedInput, EngineError, FheEngine,
    Handle, UserDecryptRequest,
};
use alloy::primitives::Address;
use async_trait::async_trait;
use av_keys::KeyMaterial;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// Engine backed by the in-process coprocessor of a local development chain.
pub struct SimulationEngine {
    coprocessor: Arc<SimulationCoprocessor>,
}

impl SimulationEngine {
    /// Fails unless `material` is the material derived from the
    /// coprocessor's own fixture.
    pub fn new(
        coprocessor: Arc<SimulationCoprocessor>,
        material: &KeyMaterial,
    ) -> Result<Self, EngineError> {
        if *material != KeyMaterial::simulation(coprocessor.fixture()) {
            return Err(EngineError::Initialization(format!(
                "key material {} does not belong to the local protocol deployment",
                material.public_key_id
            )));
        }
        Ok(Self { coprocessor })
    }
}

#[async_trait]
impl FheEngine for SimulationEngine {
    fn create_encrypted_input(
        &self,
        contract: Address,
        user: Address,
    ) -> Box<dyn EncryptedInput + '_> {
        Box::new(SimulationInput {
            coprocessor: &self.coprocessor,
            contract,
            user,
            lanes: Lanes::default(),
        })
    }

    fn create_authorization_message(
        &self,
        public_key: &[u8],
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u32,
    ) -> AuthorizationMessage {
        let protocol = self.coprocessor.fixture().protocol();
        AuthorizationMessage::new(
            protocol.gateway_chain_id,
            protocol.decryption_verifier,
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        )
    }

    #[instrument(skip_all, fields(user = %request.user_address, handles = request.pairs.len()))]
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest<'_>,
    ) -> Result<BTreeMap<Handle, ClearValue>, EngineError> {
        let message = self.create_authorization_message(
            request.keypair.public_key(),
            &request.contract_addresses,
            request.start_timestamp,
            request.duration_days,
        );
        let sealed = self.coprocessor.user_decrypt(&request, &message).await?;

        sealed
            .into_iter()
            .map(|(handle, payload)| {
                let clear = request.keypair.open(&payload)?;
                Ok((handle, ClearValue::from_sealed_bytes(&clear)?))
            })
            .collect()
    }
}

struct SimulationInput<'a> {
    coprocessor: &'a SimulationCoprocessor,
    contract: Address,
    user: Address,
    lanes: Lanes,
}

#[async_trait]
impl EncryptedInput for SimulationInput<'_> {
    fn add32(&mut self, value: u64) -> Result<(), EngineError> {
        self.lanes.push(value)
    }

    fn len(&self) -> usize {
        self.lanes.len()
    }

    async fn encrypt(self: Box<Self>) -> Result<CipherBundle, EngineError> {
        let values = self.lanes.into_values()?;
        self.coprocessor
            .register_input(self.contract, self.user, &values)
            .await
    }
}
