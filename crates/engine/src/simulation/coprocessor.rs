// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::proof::{input_digest, InputProof};
use crate::types::{EUINT32_TYPE, HANDLE_VERSION};
use crate::{
    AuthorizationMessage, CipherBundle, ClearValue, EngineError, Handle, UserDecryptRequest,
};
use alloy::primitives::{keccak256, Address, Bytes, U256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use av_config::{SimulationFixture, MAX_VALIDITY_DAYS};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{debug, warn};

const SECONDS_PER_DAY: u64 = 86_400;
/// Index byte of handles produced by computation rather than input.
const COMPUTED_INDEX: u8 = 0xff;

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[derive(Debug, Default)]
struct CoprocessorState {
    values: HashMap<Handle, u32>,
    acl: HashMap<Handle, HashSet<Address>>,
    nonce: u64,
    decrypt_requests: usize,
}

impl CoprocessorState {
    fn next_nonce(&mut self) -> u64 {
        self.nonce += 1;
        self.nonce
    }

    fn value(&self, handle: &Handle) -> Result<u32, EngineError> {
        self.values
            .get(handle)
            .copied()
            .ok_or_else(|| EngineError::InvalidInput(format!("unknown handle {handle}")))
    }

    fn is_allowed(&self, handle: &Handle, account: &Address) -> bool {
        self.acl
            .get(handle)
            .is_some_and(|accounts| accounts.contains(account))
    }
}

/// In-process stand-in for the ledger's FHE coprocessor and KMS.
///
/// Holds euint32 values behind handles, an access list per handle, and
/// answers user decryptions the way the KMS does: signature, window and
/// access are checked before anything is re-encrypted to the caller.
#[derive(Debug)]
pub struct SimulationCoprocessor {
    fixture: SimulationFixture,
    input_signer: PrivateKeySigner,
    state: RwLock<CoprocessorState>,
}

impl SimulationCoprocessor {
    pub fn new(fixture: SimulationFixture) -> Result<Self, EngineError> {
        let input_signer = PrivateKeySigner::from_bytes(&fixture.input_signer_key)
            .map_err(|e| EngineError::Initialization(format!("input signer key: {e}")))?;
        Ok(Self {
            fixture,
            input_signer,
            state: RwLock::new(CoprocessorState::default()),
        })
    }

    pub fn fixture(&self) -> &SimulationFixture {
        &self.fixture
    }

    pub fn input_signer(&self) -> Address {
        self.input_signer.address()
    }

    fn handle(&self, seed: &[u8], index: u8) -> Handle {
        let mut bytes = keccak256([seed, &[index]].concat()).0;
        bytes[21] = index;
        bytes[22..30].copy_from_slice(&self.fixture.chain_id.to_be_bytes());
        bytes[30] = EUINT32_TYPE;
        bytes[31] = HANDLE_VERSION;
        Handle::new(bytes.into())
    }

    /// Registers the lanes of one input and signs the proof binding them to
    /// `(contract, user)`.
    pub async fn register_input(
        &self,
        contract: Address,
        user: Address,
        values: &[u32],
    ) -> Result<CipherBundle, EngineError> {
        let mut state = self.state.write().await;
        let nonce = state.next_nonce();

        let mut seed = Vec::with_capacity(8 + 40 + values.len() * 4);
        seed.extend_from_slice(&nonce.to_be_bytes());
        seed.extend_from_slice(contract.as_slice());
        seed.extend_from_slice(user.as_slice());
        for value in values {
            seed.extend_from_slice(&value.to_be_bytes());
        }
        let blob = keccak256(&seed);

        let handles = values
            .iter()
            .enumerate()
            .map(|(index, _)| {
                u8::try_from(index)
                    .map(|index| self.handle(blob.as_slice(), index))
                    .map_err(|_| EngineError::Encryption("too many lanes".into()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (handle, value) in handles.iter().zip(values) {
            state.values.insert(*handle, *value);
        }

        let digest = input_digest(&handles, user, contract, self.fixture.chain_id);
        let signature = self
            .input_signer
            .sign_hash_sync(&digest)
            .map_err(|e| EngineError::Encryption(format!("could not sign input proof: {e}")))?;
        let input_proof = InputProof {
            handles: handles.clone(),
            signatures: vec![signature],
            extra_data: Bytes::new(),
        }
        .to_bytes()?;

        debug!(lanes = handles.len(), %contract, %user, "registered encrypted input");
        Ok(CipherBundle {
            handles,
            input_proof,
        })
    }

    /// Ledger side check of a submitted bundle. On success `contract` may use
    /// the handles.
    pub async fn verify_input(
        &self,
        bundle: &CipherBundle,
        contract: Address,
        user: Address,
    ) -> Result<Vec<Handle>, EngineError> {
        let proof = InputProof::parse(&bundle.input_proof)?;
        if proof.handles != bundle.handles {
            return Err(EngineError::InvalidInput(
                "handles do not match the input proof".into(),
            ));
        }

        let digest = input_digest(&proof.handles, user, contract, self.fixture.chain_id);
        let signed = proof.signatures.iter().any(|signature| {
            signature
                .recover_address_from_prehash(&digest)
                .is_ok_and(|signer| signer == self.input_signer.address())
        });
        if !signed {
            warn!(%contract, %user, "input proof not signed for this contract and user");
            return Err(EngineError::InvalidInput(
                "input proof is not valid for this contract and user".into(),
            ));
        }

        let mut state = self.state.write().await;
        for handle in &proof.handles {
            state.value(handle)?;
        }
        for handle in &proof.handles {
            state.acl.entry(*handle).or_default().insert(contract);
        }
        Ok(proof.handles)
    }

    /// Encrypts a public constant.
    pub async fn trivial_encrypt(&self, value: u32) -> Handle {
        let mut state = self.state.write().await;
        let nonce = state.next_nonce();
        let mut seed = b"trivial".to_vec();
        seed.extend_from_slice(&nonce.to_be_bytes());
        seed.extend_from_slice(&value.to_be_bytes());
        let handle = self.handle(&seed, COMPUTED_INDEX);
        state.values.insert(handle, value);
        handle
    }

    /// Homomorphic euint32 addition, wrapping like the on-chain type.
    pub async fn add(&self, lhs: Handle, rhs: Handle) -> Result<Handle, EngineError> {
        let mut state = self.state.write().await;
        let sum = state.value(&lhs)?.wrapping_add(state.value(&rhs)?);
        let nonce = state.next_nonce();
        let mut seed = b"add".to_vec();
        seed.extend_from_slice(lhs.as_slice());
        seed.extend_from_slice(rhs.as_slice());
        seed.extend_from_slice(&nonce.to_be_bytes());
        let handle = self.handle(&seed, COMPUTED_INDEX);
        state.values.insert(handle, sum);
        Ok(handle)
    }

    pub async fn allow(&self, handle: Handle, account: Address) -> Result<(), EngineError> {
        let mut state = self.state.write().await;
        state.value(&handle)?;
        state.acl.entry(handle).or_default().insert(account);
        Ok(())
    }

    pub async fn is_allowed(&self, handle: Handle, account: Address) -> bool {
        self.state.read().await.is_allowed(&handle, &account)
    }

    /// Number of user decryptions that reached the KMS.
    pub async fn decrypt_requests(&self) -> usize {
        self.state.read().await.decrypt_requests
    }

    /// KMS side of a user decryption. Returns every value sealed to the
    /// request's ephemeral public key.
    pub async fn user_decrypt(
        &self,
        request: &UserDecryptRequest<'_>,
        message: &AuthorizationMessage,
    ) -> Result<BTreeMap<Handle, Vec<u8>>, EngineError> {
        let mut state = self.state.write().await;
        state.decrypt_requests += 1;

        if request.duration_days == 0 || request.duration_days > MAX_VALIDITY_DAYS {
            return Err(EngineError::Rejected(format!(
                "validity of {} days is outside 1..={MAX_VALIDITY_DAYS}",
                request.duration_days
            )));
        }
        let now = unix_now();
        let end = request
            .start_timestamp
            .saturating_add(request.duration_days as u64 * SECONDS_PER_DAY);
        if now < request.start_timestamp || now >= end {
            return Err(EngineError::Rejected(
                "authorization is outside its validity window".into(),
            ));
        }

        let signer = request
            .signature
            .recover_address_from_prehash(&message.signing_hash())
            .map_err(|e| EngineError::Rejected(format!("invalid signature: {e}")))?;
        if signer != request.user_address {
            return Err(EngineError::Rejected(
                "signature does not belong to the user".into(),
            ));
        }

        let mut sealed = BTreeMap::new();
        for pair in &request.pairs {
            if !request.contract_addresses.contains(&pair.contract_address) {
                return Err(EngineError::Rejected(format!(
                    "contract {} is not covered by the authorization",
                    pair.contract_address
                )));
            }
            if pair.contract_address == request.user_address {
                return Err(EngineError::Rejected(
                    "user and contract must differ".into(),
                ));
            }
            if !state.is_allowed(&pair.handle, &request.user_address)
                || !state.is_allowed(&pair.handle, &pair.contract_address)
            {
                return Err(EngineError::Rejected(format!(
                    "not authorized to decrypt {}",
                    pair.handle
                )));
            }
            let value = state
                .value(&pair.handle)
                .map_err(|e| EngineError::Rejected(e.to_string()))?;
            let clear = ClearValue::Uint(U256::from(value));
            sealed.insert(
                pair.handle,
                av_crypto::seal(request.keypair.public_key(), &clear.to_sealed_bytes())
                    .map_err(|e| EngineError::Rejected(e.to_string()))?,
            );
        }

        debug!(handles = sealed.len(), user = %request.user_address, "user decryption granted");
        Ok(sealed)
    }
}
