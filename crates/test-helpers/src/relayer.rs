// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! An in-memory relayer, KMS and key server for one live network.
//!
//! It holds a real BFV secret key, serves the matching public key through the
//! key url document, verifies ciphertext payloads, signs input proofs and
//! answers user decryptions after checking the signed authorization.

use crate::fixtures::mock_protocol;
use alloy::primitives::{keccak256, Address, Signature, U256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use async_trait::async_trait;
use av_config::{KeySource, NetworkConfig, ProtocolAddresses, MAX_VALIDITY_DAYS};
use av_engine::relayer::decode_lanes;
use av_engine::relayer::wire::{
    InputProofRequest, SealedShare, UserDecryptBody, INPUT_PROOF_PATH, USER_DECRYPT_PATH,
};
use av_engine::{
    input_digest, unix_now, AuthorizationMessage, CipherBundle, ClearValue, Handle, InputProof,
    EUINT32_TYPE, HANDLE_VERSION,
};
use av_fhe_params::{encode_bfv_params, LanePreset};
use av_transport::{HttpTransport, TransportError};
use fhe::bfv::{BfvParameters, Ciphertext, Encoding, Plaintext, PublicKey, SecretKey};
use fhe_traits::{DeserializeParametrized, FheDecoder, FheDecrypter, Serialize};
use rand::thread_rng;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub const MOCK_CHAIN_ID: u64 = 11155111;
const BASE_URL: &str = "https://relayer.mock";
const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Default)]
struct State {
    ciphertexts: HashMap<Handle, Ciphertext>,
    acl: HashMap<Handle, HashSet<Address>>,
    nonce: u64,
    input_failure: Option<(u16, String)>,
    decrypt_failure: Option<(u16, String)>,
    input_requests: usize,
    decrypt_requests: usize,
}

pub struct MockRelayer {
    params: Arc<BfvParameters>,
    secret_key: SecretKey,
    public_key: Vec<u8>,
    protocol: ProtocolAddresses,
    coprocessor: PrivateKeySigner,
    state: Mutex<State>,
}

fn rejected(url: &str, body: impl Into<String>) -> TransportError {
    TransportError::Status {
        url: url.to_string(),
        status: 400,
        body: body.into(),
    }
}

impl Default for MockRelayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRelayer {
    pub fn new() -> Self {
        let params = LanePreset::InsecureLane512
            .build_arc()
            .expect("insecure preset builds");
        let mut rng = thread_rng();
        let secret_key = SecretKey::random(&params, &mut rng);
        let public_key = PublicKey::new(&secret_key, &mut rng).to_bytes();
        Self {
            params,
            secret_key,
            public_key,
            protocol: mock_protocol(MOCK_CHAIN_ID),
            coprocessor: PrivateKeySigner::random(),
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn keyurl(&self) -> String {
        format!("{BASE_URL}/v1/keyurl")
    }

    fn public_key_url(&self) -> String {
        format!("{BASE_URL}/keys/public-key")
    }

    fn public_params_url(&self) -> String {
        format!("{BASE_URL}/keys/crs-2048")
    }

    /// A live network pointing every url at this relayer.
    pub fn network(&self) -> NetworkConfig {
        NetworkConfig {
            name: "mock-relayer".to_string(),
            chain_id: MOCK_CHAIN_ID,
            rpc_url: None,
            hub_contract: None,
            relayer_url: Some(BASE_URL.to_string()),
            key_source: Some(KeySource::Keyurl { url: self.keyurl() }),
            params_class: "2048".to_string(),
            protocol: Some(self.protocol),
        }
    }

    pub fn protocol(&self) -> ProtocolAddresses {
        self.protocol
    }

    pub fn fail_input_proof(&self, status: u16, body: &str) {
        self.lock().input_failure = Some((status, body.to_string()));
    }

    pub fn fail_user_decrypt(&self, status: u16, body: &str) {
        self.lock().decrypt_failure = Some((status, body.to_string()));
    }

    pub fn input_requests(&self) -> usize {
        self.lock().input_requests
    }

    pub fn decrypt_requests(&self) -> usize {
        self.lock().decrypt_requests
    }

    pub fn allow(&self, handle: Handle, account: Address) {
        self.lock().acl.entry(handle).or_default().insert(account);
    }

    /// Homomorphic sum of `handles`, as the ledger would compute it.
    pub fn aggregate(&self, handles: &[Handle]) -> Option<Handle> {
        let mut state = self.lock();
        let mut cts = handles.iter().map(|h| state.ciphertexts.get(h));
        let first = cts.next()??.clone();
        let sum = cts.try_fold(first, |acc, ct| ct.map(|ct| &acc + ct))?;
        state.nonce += 1;
        let seed = [b"aggregate".as_slice(), &state.nonce.to_be_bytes()].concat();
        let handle = self.handle(&seed, 0xff);
        state.ciphertexts.insert(handle, sum);
        Some(handle)
    }

    /// Whether the ledger would accept `bundle` from `user` at `contract`.
    pub fn verify_bundle(&self, bundle: &CipherBundle, contract: Address, user: Address) -> bool {
        let Ok(proof) = InputProof::parse(&bundle.input_proof) else {
            return false;
        };
        let digest = input_digest(&proof.handles, user, contract, MOCK_CHAIN_ID);
        proof.handles == bundle.handles
            && proof.signatures.iter().any(|s| {
                s.recover_address_from_prehash(&digest)
                    .is_ok_and(|a| a == self.coprocessor.address())
            })
    }

    fn handle(&self, seed: &[u8], index: u8) -> Handle {
        let mut bytes = keccak256([seed, &[index]].concat()).0;
        bytes[21] = index;
        bytes[22..30].copy_from_slice(&MOCK_CHAIN_ID.to_be_bytes());
        bytes[30] = EUINT32_TYPE;
        bytes[31] = HANDLE_VERSION;
        Handle::new(bytes.into())
    }

    fn keyurl_document(&self) -> Value {
        json!({
            "response": {
                "fhe_key_info": [{
                    "fhe_public_key": { "data_id": "mock-pk", "urls": [self.public_key_url()] }
                }],
                "crs": {
                    "2048": { "data_id": "mock-crs-2048", "urls": [self.public_params_url()] }
                }
            }
        })
    }

    fn input_proof(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let mut state = self.lock();
        state.input_requests += 1;
        if let Some((status, body)) = state.input_failure.clone() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let request: InputProofRequest =
            serde_json::from_value(body.clone()).map_err(|e| rejected(url, e.to_string()))?;
        if request.contract_chain_id != format!("{MOCK_CHAIN_ID:#x}") {
            return Err(rejected(url, "wrong chain"));
        }
        let payload = request.ciphertext_with_input_verification.trim_start_matches("0x");
        let payload = hex::decode(payload).map_err(|e| rejected(url, e.to_string()))?;
        let lanes = decode_lanes(&payload).map_err(|e| rejected(url, e.to_string()))?;
        let cts = lanes
            .iter()
            .map(|ct| Ciphertext::from_bytes(ct, &self.params))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| rejected(url, format!("invalid ciphertext: {e}")))?;

        state.nonce += 1;
        let seed = [keccak256(&payload).as_slice(), &state.nonce.to_be_bytes()].concat();
        let mut handles = Vec::with_capacity(cts.len());
        for (index, ct) in cts.into_iter().enumerate() {
            let handle = self.handle(&seed, index as u8);
            state.ciphertexts.insert(handle, ct);
            let acl = state.acl.entry(handle).or_default();
            acl.insert(request.contract_address);
            acl.insert(request.user_address);
            handles.push(handle);
        }

        let digest = input_digest(
            &handles,
            request.user_address,
            request.contract_address,
            MOCK_CHAIN_ID,
        );
        let signature = self
            .coprocessor
            .sign_hash_sync(&digest)
            .map_err(|e| rejected(url, e.to_string()))?;

        debug!(lanes = handles.len(), "mock relayer issued input proof");
        Ok(json!({
            "response": {
                "handles": handles,
                "signatures": [hex::encode(signature.as_bytes())],
            }
        }))
    }

    fn user_decrypt(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let mut state = self.lock();
        state.decrypt_requests += 1;
        if let Some((status, body)) = state.decrypt_failure.clone() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let request: UserDecryptBody =
            serde_json::from_value(body.clone()).map_err(|e| rejected(url, e.to_string()))?;
        let start: u64 = request
            .request_validity
            .start_timestamp
            .parse()
            .map_err(|_| rejected(url, "bad startTimestamp"))?;
        let days: u32 = request
            .request_validity
            .duration_days
            .parse()
            .map_err(|_| rejected(url, "bad durationDays"))?;
        if days == 0 || days > MAX_VALIDITY_DAYS {
            return Err(rejected(url, "durationDays out of range"));
        }
        let now = unix_now();
        if now < start || now >= start + days as u64 * SECONDS_PER_DAY {
            return Err(rejected(url, "request expired"));
        }

        let public_key =
            hex::decode(&request.public_key).map_err(|e| rejected(url, e.to_string()))?;
        let signature = hex::decode(&request.signature)
            .ok()
            .and_then(|bytes| Signature::try_from(bytes.as_slice()).ok())
            .ok_or_else(|| rejected(url, "bad signature"))?;
        let message = AuthorizationMessage::new(
            self.protocol.gateway_chain_id,
            self.protocol.decryption_verifier,
            &public_key,
            &request.contract_addresses,
            start,
            days,
        );
        let signer = signature
            .recover_address_from_prehash(&message.signing_hash())
            .map_err(|e| rejected(url, e.to_string()))?;
        if signer != request.user_address {
            return Err(rejected(url, "invalid EIP-712 signature"));
        }

        let mut shares = Vec::with_capacity(request.handle_contract_pairs.len());
        for pair in &request.handle_contract_pairs {
            let allowed = |account: &Address| {
                state
                    .acl
                    .get(&pair.handle)
                    .is_some_and(|acl| acl.contains(account))
            };
            if !request.contract_addresses.contains(&pair.contract_address)
                || !allowed(&request.user_address)
                || !allowed(&pair.contract_address)
            {
                return Err(rejected(url, format!("not authorized for {}", pair.handle)));
            }
            let ct = state
                .ciphertexts
                .get(&pair.handle)
                .ok_or_else(|| rejected(url, format!("unknown handle {}", pair.handle)))?;
            let pt: Plaintext = self
                .secret_key
                .try_decrypt(ct)
                .map_err(|e| rejected(url, e.to_string()))?;
            let value = Vec::<u64>::try_decode(&pt, Encoding::poly())
                .map_err(|e| rejected(url, e.to_string()))?
                .first()
                .copied()
                .unwrap_or_default();
            let sealed = av_crypto::seal(
                &public_key,
                &ClearValue::Uint(U256::from(value)).to_sealed_bytes(),
            )
            .map_err(|e| rejected(url, e.to_string()))?;
            shares.push(SealedShare {
                handle: pair.handle,
                payload: hex::encode(sealed),
            });
        }

        Ok(json!({ "response": shares }))
    }
}

#[async_trait]
impl HttpTransport for MockRelayer {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        if url == self.keyurl() {
            Ok(self.keyurl_document())
        } else {
            Err(TransportError::request(url, "no route to host"))
        }
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        if url == self.public_key_url() {
            Ok(self.public_key.clone())
        } else if url == self.public_params_url() {
            Ok(encode_bfv_params(&self.params))
        } else {
            Err(TransportError::request(url, "no route to host"))
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        match url.strip_prefix(BASE_URL) {
            Some(INPUT_PROOF_PATH) => self.input_proof(url, body),
            Some(USER_DECRYPT_PATH) => self.user_decrypt(url, body),
            _ => Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
                body: "not found".to_string(),
            }),
        }
    }
}
