// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::EngineError;
use alloy::primitives::{Address, Bytes, Signature, B256, U256};
use av_crypto::EphemeralKeypair;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FHE type tag stored in byte 30 of a handle.
pub const EUINT32_TYPE: u8 = 4;
pub const HANDLE_VERSION: u8 = 0;

/// Opaque 32 byte reference to a ciphertext held by the coprocessor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(B256);

impl Handle {
    pub const fn new(bytes: B256) -> Self {
        Self(bytes)
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Lane index within the input that created the handle.
    pub fn index(&self) -> u8 {
        self.0[21]
    }

    pub fn chain_id(&self) -> u64 {
        let mut chain = [0u8; 8];
        chain.copy_from_slice(&self.0[22..30]);
        u64::from_be_bytes(chain)
    }

    pub fn fhe_type(&self) -> u8 {
        self.0[30]
    }

    pub fn version(&self) -> u8 {
        self.0[31]
    }
}

impl From<B256> for Handle {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<Handle> for B256 {
    fn from(value: Handle) -> Self {
        value.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({self})")
    }
}

impl FromStr for Handle {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s)
            .map(Handle)
            .map_err(|e| EngineError::InvalidInput(format!("invalid handle {s}: {e}")))
    }
}

/// Encrypted ballot ready for submission: one handle per lane plus the proof
/// that binds them to a (contract, user) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherBundle {
    pub handles: Vec<Handle>,
    pub input_proof: Bytes,
}

/// A decrypted value as the engine reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearValue {
    Uint(U256),
    Bool(bool),
    Bytes(Bytes),
}

const TAG_UINT: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_BYTES: u8 = 2;

impl ClearValue {
    /// `[tag][payload]`, the plaintext that gets sealed to the user's key.
    pub fn to_sealed_bytes(&self) -> Vec<u8> {
        match self {
            ClearValue::Uint(v) => {
                let mut out = vec![TAG_UINT];
                out.extend_from_slice(&v.to_be_bytes::<32>());
                out
            }
            ClearValue::Bool(b) => vec![TAG_BOOL, u8::from(*b)],
            ClearValue::Bytes(bytes) => {
                let mut out = vec![TAG_BYTES];
                out.extend_from_slice(bytes);
                out
            }
        }
    }

    pub fn from_sealed_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        match bytes.split_first() {
            Some((&TAG_UINT, rest)) if rest.len() == 32 => {
                Ok(ClearValue::Uint(U256::from_be_slice(rest)))
            }
            Some((&TAG_BOOL, [b])) => Ok(ClearValue::Bool(*b != 0)),
            Some((&TAG_BYTES, rest)) => Ok(ClearValue::Bytes(Bytes::copy_from_slice(rest))),
            _ => Err(EngineError::Rejected(
                "decrypted value has an unknown encoding".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleContractPair {
    pub handle: Handle,
    pub contract_address: Address,
}

/// Everything a user decryption needs once the wallet has signed.
#[derive(Debug)]
pub struct UserDecryptRequest<'a> {
    pub pairs: Vec<HandleContractPair>,
    pub keypair: &'a EphemeralKeypair,
    pub signature: Signature,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    pub start_timestamp: u64,
    pub duration_days: u32,
}

impl UserDecryptRequest<'_> {
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.pairs.iter().map(|p| p.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    #[test]
    fn test_handle_layout() {
        let handle = Handle::new(b256!(
            "0x111111111111111111111111111111111111111111030000000000007a690400"
        ));
        assert_eq!(handle.index(), 3);
        assert_eq!(handle.chain_id(), 31337);
        assert_eq!(handle.fhe_type(), EUINT32_TYPE);
        assert_eq!(handle.version(), HANDLE_VERSION);
    }

    #[test]
    fn test_handle_text() {
        let text = "0x00000000000000000000000000000000000000000000000000000000000000ff";
        let handle = Handle::from_str(text).unwrap();
        assert_eq!(handle.to_string(), text);
        assert_eq!(
            serde_json::to_value(handle).unwrap(),
            serde_json::Value::String(text.to_string())
        );
        assert!(Handle::from_str("0x1234").is_err());
    }

    #[test]
    fn test_clear_value_encoding() {
        for value in [
            ClearValue::Uint(U256::from(7u64)),
            ClearValue::Bool(true),
            ClearValue::Bytes(Bytes::from_static(b"abc")),
        ] {
            let bytes = value.to_sealed_bytes();
            assert_eq!(ClearValue::from_sealed_bytes(&bytes).unwrap(), value);
        }
        assert!(ClearValue::from_sealed_bytes(&[]).is_err());
        assert!(ClearValue::from_sealed_bytes(&[0, 1, 2]).is_err());
    }

    #[test]
    fn test_bundle_json_shape() {
        let bundle = CipherBundle {
            handles: vec![Handle::new(B256::ZERO)],
            input_proof: Bytes::from_static(&[1, 2]),
        };
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["inputProof"], "0x0102");
        assert_eq!(json["handles"].as_array().map(Vec::len), Some(1));
    }
}
