// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use av_crypto::CryptoError;
use av_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Value {0} does not fit a 32 bit lane")]
    LaneOverflow(u64),

    #[error("Engine could not be initialized: {0}")]
    Initialization(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Input proof rejected: {0}")]
    InvalidInput(String),

    #[error("Decryption rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<CryptoError> for EngineError {
    fn from(value: CryptoError) -> Self {
        EngineError::Rejected(format!("sealed result could not be opened: {value}"))
    }
}
