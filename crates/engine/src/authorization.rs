// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Typed-data authorization for user decryption.
//!
//! The wallet signs an EIP-712 `UserDecryptRequestVerification` that binds
//! the ephemeral public key to the contracts and validity window. The KMS
//! rebuilds the same message from the request and recovers the signer.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::{Eip712Domain, SolStruct};
use serde_json::{json, Value};
use std::borrow::Cow;

pub const DOMAIN_NAME: &str = "Decryption";
pub const DOMAIN_VERSION: &str = "1";
pub const PRIMARY_TYPE: &str = "UserDecryptRequestVerification";

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct UserDecryptRequestVerification {
        bytes publicKey;
        address[] contractAddresses;
        uint256 startTimestamp;
        uint256 durationDays;
        bytes extraData;
    }
}

/// Deterministic authorization message. Identical inputs always produce the
/// same signing hash and the same serialized bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationMessage {
    chain_id: u64,
    verifying_contract: Address,
    request: UserDecryptRequestVerification,
}

impl AuthorizationMessage {
    pub fn new(
        chain_id: u64,
        verifying_contract: Address,
        public_key: &[u8],
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u32,
    ) -> Self {
        Self {
            chain_id,
            verifying_contract,
            request: UserDecryptRequestVerification {
                publicKey: Bytes::copy_from_slice(public_key),
                contractAddresses: contract_addresses.to_vec(),
                startTimestamp: U256::from(start_timestamp),
                durationDays: U256::from(duration_days),
                extraData: Bytes::from_static(&[0]),
            },
        }
    }

    pub fn domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Borrowed(DOMAIN_NAME)),
            Some(Cow::Borrowed(DOMAIN_VERSION)),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }

    pub fn request(&self) -> &UserDecryptRequestVerification {
        &self.request
    }

    pub fn public_key(&self) -> &[u8] {
        &self.request.publicKey
    }

    pub fn contract_addresses(&self) -> &[Address] {
        &self.request.contractAddresses
    }

    /// The EIP-712 digest a wallet signs.
    pub fn signing_hash(&self) -> B256 {
        self.request.eip712_signing_hash(&self.domain())
    }

    /// `eth_signTypedData_v4` payload for wallets that render the request.
    pub fn typed_data_json(&self) -> Value {
        json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" }
                ],
                PRIMARY_TYPE: [
                    { "name": "publicKey", "type": "bytes" },
                    { "name": "contractAddresses", "type": "address[]" },
                    { "name": "startTimestamp", "type": "uint256" },
                    { "name": "durationDays", "type": "uint256" },
                    { "name": "extraData", "type": "bytes" }
                ]
            },
            "primaryType": PRIMARY_TYPE,
            "domain": {
                "name": DOMAIN_NAME,
                "version": DOMAIN_VERSION,
                "chainId": self.chain_id,
                "verifyingContract": self.verifying_contract.to_checksum(None),
            },
            "message": {
                "publicKey": self.request.publicKey.to_string(),
                "contractAddresses": self
                    .request
                    .contractAddresses
                    .iter()
                    .map(|a| a.to_checksum(None))
                    .collect::<Vec<_>>(),
                "startTimestamp": self.request.startTimestamp.to_string(),
                "durationDays": self.request.durationDays.to_string(),
                "extraData": self.request.extraData.to_string(),
            }
        })
    }

    /// Canonical bytes of [`Self::typed_data_json`]; keys are emitted sorted.
    pub fn to_bytes(&self) -> Vec<u8> {
        // serializing a Value cannot fail
        serde_json::to_vec(&self.typed_data_json()).unwrap_or_default()
    }
}
