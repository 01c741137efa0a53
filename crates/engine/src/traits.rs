// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    AuthorizationMessage, CipherBundle, ClearValue, EngineError, Handle, UserDecryptRequest,
};
use alloy::primitives::Address;
use async_trait::async_trait;
use av_crypto::EphemeralKeypair;
use std::collections::BTreeMap;

/// Inputs never hold more lanes than a proof can count.
pub const MAX_LANES: usize = u8::MAX as usize;

/// The encryption engine a call works against. One instance is built per
/// call from that call's key material.
#[async_trait]
pub trait FheEngine: Send + Sync {
    /// Opens an input session whose proof is only valid for `contract` and `user`.
    fn create_encrypted_input(
        &self,
        contract: Address,
        user: Address,
    ) -> Box<dyn EncryptedInput + '_>;

    fn generate_keypair(&self) -> EphemeralKeypair {
        EphemeralKeypair::generate()
    }

    fn create_authorization_message(
        &self,
        public_key: &[u8],
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u32,
    ) -> AuthorizationMessage;

    /// Exchanges a signed authorization for the clear values of every
    /// requested handle. Either all handles resolve or the call fails.
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest<'_>,
    ) -> Result<BTreeMap<Handle, ClearValue>, EngineError>;
}

#[async_trait]
pub trait EncryptedInput: Send {
    /// Appends one 32 bit lane. Values of `2^32` and above are rejected.
    fn add32(&mut self, value: u64) -> Result<(), EngineError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encrypts every lane, in insertion order, and produces the proof.
    async fn encrypt(self: Box<Self>) -> Result<CipherBundle, EngineError>;
}

/// Lane values shared by both backends.
#[derive(Debug, Default, Clone)]
pub(crate) struct Lanes(Vec<u32>);

impl Lanes {
    pub fn push(&mut self, value: u64) -> Result<(), EngineError> {
        let lane = u32::try_from(value).map_err(|_| EngineError::LaneOverflow(value))?;
        if self.0.len() >= MAX_LANES {
            return Err(EngineError::Encryption(format!(
                "an input holds at most {MAX_LANES} lanes"
            )));
        }
        self.0.push(lane);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_values(self) -> Result<Vec<u32>, EngineError> {
        if self.0.is_empty() {
            return Err(EngineError::Encryption("input has no lanes".into()));
        }
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_bounds() {
        let mut lanes = Lanes::default();
        assert!(lanes.push(0).is_ok());
        assert!(lanes.push(u32::MAX as u64).is_ok());
        assert_eq!(
            lanes.push(1 << 32),
            Err(EngineError::LaneOverflow(1 << 32))
        );
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes.into_values().unwrap(), vec![0, u32::MAX]);
    }

    #[test]
    fn test_lane_count_limit() {
        let mut lanes = Lanes::default();
        for _ in 0..MAX_LANES {
            lanes.push(1).unwrap();
        }
        assert!(matches!(lanes.push(1), Err(EngineError::Encryption(_))));
        assert!(Lanes::default().into_values().is_err());
    }
}
