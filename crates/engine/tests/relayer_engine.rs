// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::U256;
use av_config::SimulationFixture;
use av_engine::{
    unix_now, ClearValue, EngineError, FheEngine, HandleContractPair, RelayerEngine,
    TypedDataSigner, UserDecryptRequest,
};
use av_keys::fetch_from_keyurl;
use av_test_helpers::fixtures::{voter, HUB};
use av_test_helpers::transport::MockTransport;
use av_test_helpers::MockRelayer;
use std::sync::Arc;
use tracing_test::traced_test;

async fn engine(relayer: &Arc<MockRelayer>) -> RelayerEngine {
    let material = fetch_from_keyurl(relayer.as_ref(), &relayer.keyurl(), "2048")
        .await
        .unwrap();
    RelayerEngine::new(relayer.clone(), &relayer.network(), &material).unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_encrypt_produces_bound_proof() {
    let relayer = Arc::new(MockRelayer::new());
    let engine = engine(&relayer).await;
    let user = voter(0).address();

    let mut input = engine.create_encrypted_input(HUB, user);
    for v in [0, 0, 1] {
        input.add32(v).unwrap();
    }
    let bundle = input.encrypt().await.unwrap();

    assert_eq!(bundle.handles.len(), 3);
    assert!(relayer.verify_bundle(&bundle, HUB, user));
    assert!(!relayer.verify_bundle(&bundle, HUB, voter(1).address()));
    assert!(!relayer.verify_bundle(&bundle, user, user));
    assert!(logs_contain("input proof received"));
}

#[tokio::test]
async fn test_lane_overflow_never_reaches_relayer() {
    let relayer = Arc::new(MockRelayer::new());
    let engine = engine(&relayer).await;

    let mut input = engine.create_encrypted_input(HUB, voter(0).address());
    assert_eq!(input.add32(1 << 32), Err(EngineError::LaneOverflow(1 << 32)));
    assert_eq!(relayer.input_requests(), 0);
}

#[tokio::test]
async fn test_input_proof_refusal() {
    let relayer = Arc::new(MockRelayer::new());
    let engine = engine(&relayer).await;

    relayer.fail_input_proof(400, "invalid ciphertext");
    let mut input = engine.create_encrypted_input(HUB, voter(0).address());
    input.add32(1).unwrap();
    assert!(matches!(input.encrypt().await, Err(EngineError::Encryption(_))));

    for status in [404, 429, 503] {
        relayer.fail_input_proof(status, "busy");
        let mut input = engine.create_encrypted_input(HUB, voter(0).address());
        input.add32(1).unwrap();
        assert!(
            matches!(input.encrypt().await, Err(EngineError::Transport(_))),
            "{status}"
        );
    }
}

#[tokio::test]
async fn test_user_decrypt_of_homomorphic_sum() {
    let relayer = Arc::new(MockRelayer::new());
    let engine = engine(&relayer).await;
    let wallet = voter(0);
    let user = wallet.address();

    let mut per_lane = vec![vec![], vec![]];
    for ballot in [[1u64, 0], [0, 1], [1, 0]] {
        let mut input = engine.create_encrypted_input(HUB, user);
        for v in ballot {
            input.add32(v).unwrap();
        }
        let bundle = input.encrypt().await.unwrap();
        for (lane, handle) in bundle.handles.into_iter().enumerate() {
            per_lane[lane].push(handle);
        }
    }
    let totals: Vec<_> = per_lane
        .iter()
        .map(|handles| relayer.aggregate(handles).unwrap())
        .collect();
    for handle in &totals {
        relayer.allow(*handle, HUB);
        relayer.allow(*handle, user);
    }

    let keypair = engine.generate_keypair();
    let start = unix_now();
    let message = engine.create_authorization_message(keypair.public_key(), &[HUB], start, 365);
    let signature = wallet.sign_typed_data(&message).await.unwrap();

    let values = engine
        .user_decrypt(UserDecryptRequest {
            pairs: totals
                .iter()
                .map(|handle| HandleContractPair {
                    handle: *handle,
                    contract_address: HUB,
                })
                .collect(),
            keypair: &keypair,
            signature,
            contract_addresses: vec![HUB],
            user_address: user,
            start_timestamp: start,
            duration_days: 365,
        })
        .await
        .unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values[&totals[0]], ClearValue::Uint(U256::from(2u64)));
    assert_eq!(values[&totals[1]], ClearValue::Uint(U256::from(1u64)));
}

#[tokio::test]
async fn test_user_decrypt_failure_classes() {
    let relayer = Arc::new(MockRelayer::new());
    let engine = engine(&relayer).await;
    let wallet = voter(0);

    let mut input = engine.create_encrypted_input(HUB, wallet.address());
    input.add32(5).unwrap();
    let handle = input.encrypt().await.unwrap().handles[0];

    let keypair = engine.generate_keypair();
    let start = unix_now();
    let message = engine.create_authorization_message(keypair.public_key(), &[HUB], start, 1);
    let signature = wallet.sign_typed_data(&message).await.unwrap();
    let request = || UserDecryptRequest {
        pairs: vec![HandleContractPair {
            handle,
            contract_address: HUB,
        }],
        keypair: &keypair,
        signature,
        contract_addresses: vec![HUB],
        user_address: wallet.address(),
        start_timestamp: start,
        duration_days: 1,
    };

    // signature over a different window
    let mut tampered = request();
    tampered.duration_days = 2;
    assert!(matches!(
        engine.user_decrypt(tampered).await,
        Err(EngineError::Rejected(_))
    ));

    relayer.fail_user_decrypt(403, "forbidden");
    assert!(matches!(
        engine.user_decrypt(request()).await,
        Err(EngineError::Rejected(_))
    ));

    for status in [404, 408, 429, 502] {
        relayer.fail_user_decrypt(status, "try again");
        assert!(
            matches!(
                engine.user_decrypt(request()).await,
                Err(EngineError::Transport(_))
            ),
            "{status}"
        );
    }
}

#[tokio::test]
async fn test_expired_window_rejected() {
    let relayer = Arc::new(MockRelayer::new());
    let engine = engine(&relayer).await;
    let wallet = voter(0);

    let mut input = engine.create_encrypted_input(HUB, wallet.address());
    input.add32(5).unwrap();
    let handle = input.encrypt().await.unwrap().handles[0];

    let keypair = engine.generate_keypair();
    let start = unix_now() - 3 * 86_400;
    let message = engine.create_authorization_message(keypair.public_key(), &[HUB], start, 1);
    let signature = wallet.sign_typed_data(&message).await.unwrap();

    let result = engine
        .user_decrypt(UserDecryptRequest {
            pairs: vec![HandleContractPair {
                handle,
                contract_address: HUB,
            }],
            keypair: &keypair,
            signature,
            contract_addresses: vec![HUB],
            user_address: wallet.address(),
            start_timestamp: start,
            duration_days: 1,
        })
        .await;
    assert!(matches!(result, Err(EngineError::Rejected(_))));
}

#[test]
fn test_construction_requires_relayer_and_protocol() {
    let relayer = MockRelayer::new();
    let transport = Arc::new(MockTransport::new());
    let material = av_keys::KeyMaterial::simulation(&SimulationFixture::default());

    let mut network = relayer.network();
    network.relayer_url = None;
    assert!(matches!(
        RelayerEngine::new(transport.clone(), &network, &material),
        Err(EngineError::Initialization(_))
    ));

    // simulation material is not a BFV key
    assert!(matches!(
        RelayerEngine::new(transport, &relayer.network(), &material),
        Err(EngineError::Initialization(_))
    ));
}

#[test]
fn test_builtin_sepolia_needs_protocol_addresses() {
    let transport = Arc::new(MockTransport::new());
    let material = av_keys::KeyMaterial::simulation(&SimulationFixture::default());
    match RelayerEngine::new(transport, &av_config::NetworkConfig::sepolia(), &material) {
        Err(EngineError::Initialization(reason)) => {
            assert!(reason.contains("protocol"), "{reason}")
        }
        other => panic!("expected Initialization, got {:?}", other.err()),
    }
}
