// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Signature};
use async_trait::async_trait;
use av_engine::{AuthorizationMessage, SignerError, TypedDataSigner};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A wallet whose user declines every signature request.
#[derive(Debug, Clone)]
pub struct RejectingSigner {
    address: Address,
    prompts: Arc<AtomicUsize>,
}

impl RejectingSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            prompts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Signature requests shown so far.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TypedDataSigner for RejectingSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_typed_data(
        &self,
        _message: &AuthorizationMessage,
    ) -> Result<Signature, SignerError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Err(SignerError::Rejected("user rejected the request".into()))
    }
}

/// A wallet prompt the user never answers.
#[derive(Debug, Clone)]
pub struct PendingSigner {
    address: Address,
    prompts: Arc<AtomicUsize>,
}

impl PendingSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            prompts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TypedDataSigner for PendingSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_typed_data(
        &self,
        _message: &AuthorizationMessage,
    ) -> Result<Signature, SignerError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
