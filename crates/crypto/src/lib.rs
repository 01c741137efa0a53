// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod ephemeral;
mod seal;

pub use ephemeral::EphemeralKeypair;
pub use seal::{open, seal, PUBLIC_KEY_LEN};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Recipient public key is not a valid secp256k1 point")]
    InvalidPublicKey,
    #[error("Malformed sealed value: {0}")]
    Malformed(String),
    #[error("Could not seal value")]
    Seal,
    #[error("Could not open sealed value")]
    Open,
}
