// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::AuthorizationMessage;
use alloy::primitives::{Address, Signature};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signature request was rejected: {0}")]
    Rejected(String),

    #[error("Signer failed: {0}")]
    Failed(String),
}

/// A wallet able to sign typed data on behalf of one address.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    fn address(&self) -> Address;

    async fn sign_typed_data(
        &self,
        message: &AuthorizationMessage,
    ) -> Result<Signature, SignerError>;
}

/// Signs with a private key held in process.
#[derive(Debug, Clone)]
pub struct LocalWalletSigner {
    inner: PrivateKeySigner,
}

impl LocalWalletSigner {
    pub fn new(inner: PrivateKeySigner) -> Self {
        Self { inner }
    }

    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }
}

impl From<PrivateKeySigner> for LocalWalletSigner {
    fn from(value: PrivateKeySigner) -> Self {
        Self::new(value)
    }
}

#[async_trait]
impl TypedDataSigner for LocalWalletSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn sign_typed_data(
        &self,
        message: &AuthorizationMessage,
    ) -> Result<Signature, SignerError> {
        self.inner
            .sign_hash_sync(&message.signing_hash())
            .map_err(|e| SignerError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[tokio::test]
    async fn test_local_wallet_signs_message_hash() {
        let signer = LocalWalletSigner::random();
        let message = AuthorizationMessage::new(
            31337,
            address!("0x1364cBBf2cDF5032C47d8226a6f6FBD2AFCDacAC"),
            &[2u8; 33],
            &[address!("0x5FbDB2315678afecb367f032d93F642f64180aa3")],
            1_700_000_000,
            365,
        );
        let signature = signer.sign_typed_data(&message).await.unwrap();
        assert_eq!(
            signature
                .recover_address_from_prehash(&message.signing_hash())
                .unwrap(),
            signer.address()
        );
    }
}
