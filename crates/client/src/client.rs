// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{AggregateResult, EngineFactory, VoteError};
use alloy::primitives::Address;
use av_config::{select_mode, ClientConfig, NetworkConfig, NetworkMode, MAX_VALIDITY_DAYS};
use av_engine::{
    unix_now, CipherBundle, FheEngine, Handle, HandleContractPair, SimulationCoprocessor,
    TypedDataSigner, UserDecryptRequest,
};
use av_keys::KeyProvisioner;
use av_transport::HttpTransport;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Encrypts ballots and decrypts aggregates for one network.
///
/// Holds no per-call state: every operation fetches its own key material,
/// builds its own engine and, for decryption, its own ephemeral keypair.
#[derive(Clone)]
pub struct VoteClient {
    network: NetworkConfig,
    provisioner: KeyProvisioner,
    engines: EngineFactory,
    validity_days: u32,
}

impl VoteClient {
    pub fn new(
        network: NetworkConfig,
        transport: Arc<dyn HttpTransport>,
        coprocessor: Arc<SimulationCoprocessor>,
    ) -> Self {
        let fixture = coprocessor.fixture().clone();
        let provisioner = KeyProvisioner::for_network(transport.clone(), fixture, &network);
        let engines = EngineFactory::new(network.clone(), transport, coprocessor);
        Self {
            network,
            provisioner,
            engines,
            validity_days: MAX_VALIDITY_DAYS,
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        network: &NetworkConfig,
        transport: Arc<dyn HttpTransport>,
        coprocessor: Arc<SimulationCoprocessor>,
    ) -> Self {
        Self::new(network.clone(), transport, coprocessor)
            .with_validity_days(config.validity_days())
    }

    /// Length of the decryption authorization window, clamped to 1..=365.
    pub fn with_validity_days(mut self, days: u32) -> Self {
        self.validity_days = days.clamp(1, MAX_VALIDITY_DAYS);
        self
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn mode(&self) -> NetworkMode {
        select_mode(self.network.chain_id)
    }

    pub fn validity_days(&self) -> u32 {
        self.validity_days
    }

    async fn engine(&self, mode: NetworkMode) -> Result<Box<dyn FheEngine>, VoteError> {
        let material = self.provisioner.fetch_key_material(mode).await?;
        self.engines.build(mode, &material)
    }

    /// Encrypts `vector` lane by lane for `user` voting at `contract`.
    ///
    /// One-hot shape is not checked here; see [`crate::OneHotVote`].
    #[instrument(skip_all, fields(mode = %self.mode(), %contract, %user, lanes = vector.len()))]
    pub async fn build_cipher(
        &self,
        contract: Address,
        user: Address,
        vector: &[u64],
    ) -> Result<CipherBundle, VoteError> {
        let engine = self.engine(self.mode()).await?;
        let mut input = engine.create_encrypted_input(contract, user);
        for value in vector {
            input.add32(*value)?;
        }
        let bundle = input.encrypt().await?;
        info!(handles = bundle.handles.len(), "ballot encrypted");
        Ok(bundle)
    }

    /// Authorizes and performs a user decryption of `handles` for `voter`.
    ///
    /// Suspends on the wallet prompt for as long as the user takes; dropping
    /// the returned future abandons the request.
    #[instrument(skip_all, fields(mode = %self.mode(), %contract, %voter, handles = handles.len()))]
    pub async fn decrypt_aggregate(
        &self,
        contract: Address,
        handles: &[Handle],
        voter: Address,
        signer: &dyn TypedDataSigner,
    ) -> Result<AggregateResult, VoteError> {
        let start_timestamp = unix_now();
        let duration_days = self.validity_days;

        let requested: BTreeSet<Handle> = handles.iter().copied().collect();
        if requested.is_empty() {
            debug!("nothing to decrypt");
            return Ok(AggregateResult::default());
        }
        if signer.address() != voter {
            warn!(signer = %signer.address(), "signer does not control the voter address");
            return Err(VoteError::AuthorizationDenied(format!(
                "signer {} cannot authorize for {voter}",
                signer.address()
            )));
        }

        let engine = self.engine(self.mode()).await?;
        let keypair = engine.generate_keypair();
        let contract_addresses = vec![contract];
        let message = engine.create_authorization_message(
            keypair.public_key(),
            &contract_addresses,
            start_timestamp,
            duration_days,
        );

        debug!(start_timestamp, duration_days, "requesting wallet signature");
        let signature = signer.sign_typed_data(&message).await?;

        let values = engine
            .user_decrypt(UserDecryptRequest {
                pairs: requested
                    .iter()
                    .map(|handle| HandleContractPair {
                        handle: *handle,
                        contract_address: contract,
                    })
                    .collect(),
                keypair: &keypair,
                signature,
                contract_addresses,
                user_address: voter,
                start_timestamp,
                duration_days,
            })
            .await?;

        let result = AggregateResult::from_clear_values(&requested, values)?;
        info!(values = result.len(), "aggregate decrypted");
        Ok(result)
    }
}
