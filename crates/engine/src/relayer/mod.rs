// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod wire;

use crate::proof::InputProof;
use crate::traits::Lanes;
use crate::{
    AuthorizationMessage, CipherBundle, ClearValue, EncryptedInput, EngineError, FheEngine,
    Handle, UserDecryptRequest,
};
use alloy::primitives::{Address, Bytes, Signature};
use async_trait::async_trait;
use av_config::{NetworkConfig, ProtocolAddresses};
use av_fhe_params::decode_bfv_params_arc;
use av_keys::KeyMaterial;
use av_transport::{HttpTransport, TransportError};
use fhe::bfv::{BfvParameters, Encoding, Plaintext, PublicKey};
use fhe_traits::{DeserializeParametrized, FheEncoder, FheEncrypter, Serialize};
use rand::thread_rng;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use wire::{
    InputProofRequest, InputProofResponse, RequestValidity, UserDecryptBody, UserDecryptResponse,
    INPUT_PROOF_PATH, USER_DECRYPT_PATH,
};

/// Engine that encrypts locally under the network's BFV public key and asks
/// the relayer for input proofs and user decryptions.
pub struct RelayerEngine {
    transport: Arc<dyn HttpTransport>,
    relayer_url: String,
    chain_id: u64,
    protocol: ProtocolAddresses,
    params: Arc<BfvParameters>,
    public_key: PublicKey,
    public_key_id: String,
}

impl RelayerEngine {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        network: &NetworkConfig,
        material: &KeyMaterial,
    ) -> Result<Self, EngineError> {
        let relayer_url = network.relayer_url.clone().ok_or_else(|| {
            EngineError::Initialization(format!("network '{}' has no relayer_url", network.name))
        })?;
        let protocol = network.protocol.ok_or_else(|| {
            EngineError::Initialization(format!(
                "network '{}' has no protocol addresses, set them under `protocol` in the config",
                network.name
            ))
        })?;
        let params = decode_bfv_params_arc(&material.public_params).map_err(|e| {
            EngineError::Initialization(format!(
                "public params {} are unusable: {e}",
                material.public_params_id
            ))
        })?;
        let public_key = PublicKey::from_bytes(&material.public_key, &params).map_err(|e| {
            EngineError::Initialization(format!(
                "public key {} is unusable: {e}",
                material.public_key_id
            ))
        })?;

        info!(
            network = %network.name,
            key = %material.public_key_id,
            degree = params.degree(),
            "relayer engine ready"
        );
        Ok(Self {
            transport,
            relayer_url: relayer_url.trim_end_matches('/').to_string(),
            chain_id: network.chain_id,
            protocol,
            params,
            public_key,
            public_key_id: material.public_key_id.clone(),
        })
    }

    pub fn public_key_id(&self) -> &str {
        &self.public_key_id
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.relayer_url)
    }

    fn encrypt_lanes(&self, values: &[u32]) -> Result<Vec<Vec<u8>>, EngineError> {
        let mut rng = thread_rng();
        values
            .iter()
            .map(|value| {
                let lane = vec![*value as u64];
                let pt = Plaintext::try_encode(&lane, Encoding::poly(), &self.params)
                    .map_err(|e| EngineError::Encryption(format!("Error encoding lane: {e}")))?;
                let ct = self
                    .public_key
                    .try_encrypt(&pt, &mut rng)
                    .map_err(|e| EngineError::Encryption(format!("Error encrypting lane: {e}")))?;
                Ok(ct.to_bytes())
            })
            .collect()
    }
}

/// `[count u8]` followed by `[len u32 BE][ciphertext]` per lane.
pub fn encode_lanes(ciphertexts: &[Vec<u8>]) -> Result<Vec<u8>, EngineError> {
    let count = u8::try_from(ciphertexts.len())
        .map_err(|_| EngineError::Encryption("too many lanes".into()))?;
    let mut out = vec![count];
    for ct in ciphertexts {
        let len = u32::try_from(ct.len())
            .map_err(|_| EngineError::Encryption("ciphertext too large".into()))?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(ct);
    }
    Ok(out)
}

pub fn decode_lanes(payload: &[u8]) -> Result<Vec<Vec<u8>>, EngineError> {
    let malformed = || EngineError::InvalidInput("malformed ciphertext payload".into());
    let (&count, mut rest) = payload.split_first().ok_or_else(malformed)?;
    let mut lanes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        if rest.len() < 4 {
            return Err(malformed());
        }
        let (len, tail) = rest.split_at(4);
        let len = u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize;
        if tail.len() < len {
            return Err(malformed());
        }
        let (ct, tail) = tail.split_at(len);
        lanes.push(ct.to_vec());
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(malformed());
    }
    Ok(lanes)
}

fn parse_response<T: DeserializeOwned>(
    url: &str,
    value: serde_json::Value,
) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::body(url, e))
}

fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(value.trim_start_matches("0x"))
}

#[async_trait]
impl FheEngine for RelayerEngine {
    fn create_encrypted_input(
        &self,
        contract: Address,
        user: Address,
    ) -> Box<dyn EncryptedInput + '_> {
        Box::new(RelayerInput {
            engine: self,
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
        AuthorizationMessage::new(
            self.protocol.gateway_chain_id,
            self.protocol.decryption_verifier,
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
        let url = self.endpoint(USER_DECRYPT_PATH);
        let body = UserDecryptBody {
            handle_contract_pairs: request.pairs.clone(),
            request_validity: RequestValidity {
                start_timestamp: request.start_timestamp.to_string(),
                duration_days: request.duration_days.to_string(),
            },
            contracts_chain_id: self.chain_id.to_string(),
            contract_addresses: request.contract_addresses.clone(),
            user_address: request.user_address,
            signature: hex::encode(request.signature.as_bytes()),
            public_key: hex::encode(request.keypair.public_key()),
            extra_data: "0x00".to_string(),
        };
        let body = serde_json::to_value(&body).map_err(|e| TransportError::body(&url, e))?;

        let answer = self.transport.post_json(&url, &body).await.map_err(|e| {
            if e.is_refusal() {
                EngineError::Rejected(e.to_string())
            } else {
                EngineError::Transport(e)
            }
        })?;
        let answer: UserDecryptResponse = parse_response(&url, answer)?;

        let requested: BTreeSet<Handle> = request.handles().collect();
        let mut values = BTreeMap::new();
        for share in answer.response {
            if !requested.contains(&share.handle) {
                debug!(handle = %share.handle, "ignoring unrequested handle");
                continue;
            }
            let sealed = decode_hex(&share.payload)
                .map_err(|e| EngineError::Rejected(format!("payload for {}: {e}", share.handle)))?;
            let clear = request.keypair.open(&sealed)?;
            values.insert(share.handle, ClearValue::from_sealed_bytes(&clear)?);
        }

        if let Some(missing) = requested.iter().find(|h| !values.contains_key(h)) {
            return Err(EngineError::Rejected(format!(
                "relayer returned no value for {missing}"
            )));
        }
        Ok(values)
    }
}

struct RelayerInput<'a> {
    engine: &'a RelayerEngine,
    contract: Address,
    user: Address,
    lanes: Lanes,
}

#[async_trait]
impl EncryptedInput for RelayerInput<'_> {
    fn add32(&mut self, value: u64) -> Result<(), EngineError> {
        self.lanes.push(value)
    }

    fn len(&self) -> usize {
        self.lanes.len()
    }

    #[instrument(
        skip_all,
        fields(contract = %self.contract, user = %self.user, lanes = self.lanes.len())
    )]
    async fn encrypt(self: Box<Self>) -> Result<CipherBundle, EngineError> {
        let values = self.lanes.into_values()?;
        let ciphertexts = self.engine.encrypt_lanes(&values)?;
        let payload = encode_lanes(&ciphertexts)?;

        let url = self.engine.endpoint(INPUT_PROOF_PATH);
        let body = InputProofRequest {
            contract_address: self.contract,
            user_address: self.user,
            ciphertext_with_input_verification: format!("0x{}", hex::encode(payload)),
            contract_chain_id: format!("{:#x}", self.engine.chain_id),
            extra_data: "0x00".to_string(),
        };
        let body = serde_json::to_value(&body).map_err(|e| TransportError::body(&url, e))?;

        let answer = self.engine.transport.post_json(&url, &body).await.map_err(|e| {
            if e.is_refusal() {
                EngineError::Encryption(e.to_string())
            } else {
                EngineError::Transport(e)
            }
        })?;
        let answer: InputProofResponse = parse_response(&url, answer)?;

        if answer.response.handles.len() != values.len() {
            return Err(EngineError::Encryption(format!(
                "relayer returned {} handles for {} lanes",
                answer.response.handles.len(),
                values.len()
            )));
        }
        let signatures = answer
            .response
            .signatures
            .iter()
            .map(|s| {
                decode_hex(s)
                    .ok()
                    .and_then(|bytes| Signature::try_from(bytes.as_slice()).ok())
                    .ok_or_else(|| TransportError::body(&url, format!("bad signature {s}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let input_proof = InputProof {
            handles: answer.response.handles.clone(),
            signatures,
            extra_data: Bytes::new(),
        }
        .to_bytes()?;

        debug!(lanes = values.len(), "input proof received");
        Ok(CipherBundle {
            handles: answer.response.handles,
            input_proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_payload_layout() {
        let lanes = vec![vec![1, 2, 3], vec![], vec![9; 300]];
        let payload = encode_lanes(&lanes).unwrap();
        assert_eq!(payload[0], 3);
        assert_eq!(&payload[1..5], &3u32.to_be_bytes());
        assert_eq!(decode_lanes(&payload).unwrap(), lanes);
    }

    #[test]
    fn test_lane_payload_truncated() {
        let payload = encode_lanes(&[vec![1, 2, 3]]).unwrap();
        assert!(decode_lanes(&payload[..payload.len() - 1]).is_err());
        assert!(decode_lanes(&[]).is_err());
        let mut trailing = payload.clone();
        trailing.push(0);
        assert!(decode_lanes(&trailing).is_err());
    }
}
