// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use av_config::SimulationFixture;
use av_crypto::EphemeralKeypair;
use av_engine::{
    unix_now, ClearValue, EngineError, FheEngine, Handle, HandleContractPair,
    SimulationCoprocessor, SimulationEngine, TypedDataSigner, UserDecryptRequest,
};
use av_keys::KeyMaterial;
use av_test_helpers::fixtures::{voter, HUB};
use std::sync::Arc;

struct Harness {
    coprocessor: Arc<SimulationCoprocessor>,
    engine: SimulationEngine,
}

impl Harness {
    fn new() -> Self {
        let fixture = SimulationFixture::default();
        let coprocessor = Arc::new(SimulationCoprocessor::new(fixture.clone()).unwrap());
        let engine =
            SimulationEngine::new(coprocessor.clone(), &KeyMaterial::simulation(&fixture)).unwrap();
        Self {
            coprocessor,
            engine,
        }
    }

    /// Submits `value` from `user` and grants `user` the stored handle.
    async fn stored(&self, user: Address, value: u64) -> Handle {
        let mut input = self.engine.create_encrypted_input(HUB, user);
        input.add32(value).unwrap();
        let bundle = input.encrypt().await.unwrap();
        let handle = self
            .coprocessor
            .verify_input(&bundle, HUB, user)
            .await
            .unwrap()[0];
        self.coprocessor.allow(handle, user).await.unwrap();
        handle
    }

    async fn decrypt(
        &self,
        signer: &dyn TypedDataSigner,
        keypair: &EphemeralKeypair,
        handle: Handle,
        contracts: Vec<Address>,
        start: u64,
        days: u32,
    ) -> Result<ClearValue, EngineError> {
        let message =
            self.engine
                .create_authorization_message(keypair.public_key(), &contracts, start, days);
        let signature = signer.sign_typed_data(&message).await.unwrap();
        let mut values = self
            .engine
            .user_decrypt(UserDecryptRequest {
                pairs: vec![HandleContractPair {
                    handle,
                    contract_address: HUB,
                }],
                keypair,
                signature,
                contract_addresses: contracts,
                user_address: signer.address(),
                start_timestamp: start,
                duration_days: days,
            })
            .await?;
        values
            .remove(&handle)
            .ok_or_else(|| EngineError::Rejected("missing".into()))
    }
}

#[tokio::test]
async fn test_owner_can_decrypt() {
    let harness = Harness::new();
    let wallet = voter(0);
    let handle = harness.stored(wallet.address(), 7).await;
    let keypair = harness.engine.generate_keypair();

    let value = harness
        .decrypt(&wallet, &keypair, handle, vec![HUB], unix_now(), 365)
        .await
        .unwrap();
    assert_eq!(value, ClearValue::Uint(U256::from(7u64)));
    assert_eq!(harness.coprocessor.decrypt_requests().await, 1);
}

#[tokio::test]
async fn test_access_list_enforced() {
    let harness = Harness::new();
    let handle = harness.stored(voter(0).address(), 7).await;
    let keypair = harness.engine.generate_keypair();

    let stranger = voter(1);
    assert!(matches!(
        harness
            .decrypt(&stranger, &keypair, handle, vec![HUB], unix_now(), 365)
            .await,
        Err(EngineError::Rejected(_))
    ));
}

#[tokio::test]
async fn test_contract_must_be_authorized() {
    let harness = Harness::new();
    let wallet = voter(0);
    let handle = harness.stored(wallet.address(), 7).await;
    let keypair = harness.engine.generate_keypair();

    let elsewhere = Address::repeat_byte(0x42);
    assert!(matches!(
        harness
            .decrypt(&wallet, &keypair, handle, vec![elsewhere], unix_now(), 365)
            .await,
        Err(EngineError::Rejected(_))
    ));
}

#[tokio::test]
async fn test_validity_window() {
    let harness = Harness::new();
    let wallet = voter(0);
    let handle = harness.stored(wallet.address(), 7).await;
    let keypair = harness.engine.generate_keypair();
    let now = unix_now();

    for (start, days) in [(now - 2 * 86_400, 1), (now + 3_600, 1), (now, 0), (now, 366)] {
        assert!(
            matches!(
                harness
                    .decrypt(&wallet, &keypair, handle, vec![HUB], start, days)
                    .await,
                Err(EngineError::Rejected(_))
            ),
            "start={start} days={days}"
        );
    }
}

#[tokio::test]
async fn test_wrapping_addition() {
    let harness = Harness::new();
    let wallet = voter(0);
    let a = harness.stored(wallet.address(), u32::MAX as u64).await;
    let two = harness.coprocessor.trivial_encrypt(2).await;
    let sum = harness.coprocessor.add(a, two).await.unwrap();
    harness.coprocessor.allow(sum, HUB).await.unwrap();
    harness.coprocessor.allow(sum, wallet.address()).await.unwrap();

    let keypair = harness.engine.generate_keypair();
    let value = harness
        .decrypt(&wallet, &keypair, sum, vec![HUB], unix_now(), 1)
        .await
        .unwrap();
    assert_eq!(value, ClearValue::Uint(U256::from(1u64)));
}
