// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! JSON bodies exchanged with the relayer.

use crate::{Handle, HandleContractPair};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

pub const INPUT_PROOF_PATH: &str = "/v1/input-proof";
pub const USER_DECRYPT_PATH: &str = "/v1/user-decrypt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputProofRequest {
    pub contract_address: Address,
    pub user_address: Address,
    pub ciphertext_with_input_verification: String,
    pub contract_chain_id: String,
    pub extra_data: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputProofResponse {
    pub response: InputProofResult,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputProofResult {
    pub handles: Vec<Handle>,
    /// Hex encoded coprocessor signatures, 65 bytes each.
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestValidity {
    pub start_timestamp: String,
    pub duration_days: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDecryptBody {
    pub handle_contract_pairs: Vec<HandleContractPair>,
    pub request_validity: RequestValidity,
    pub contracts_chain_id: String,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    /// Hex without `0x`.
    pub signature: String,
    /// Hex without `0x`.
    pub public_key: String,
    pub extra_data: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserDecryptResponse {
    pub response: Vec<SealedShare>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SealedShare {
    pub handle: Handle,
    /// Hex encoded payload sealed to the request's public key.
    pub payload: String,
}
