// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! The encryption engine capability and its two backends.
//!
//! [`SimulationEngine`] runs against an in-process coprocessor for the local
//! development chain. [`RelayerEngine`] encrypts under the network's public
//! key and talks to the relayer over [`av_transport::HttpTransport`].

mod authorization;
mod error;
mod proof;
pub mod relayer;
mod signer;
pub mod simulation;
mod traits;
mod types;

pub use authorization::*;
pub use error::EngineError;
pub use proof::{input_digest, InputProof};
pub use relayer::RelayerEngine;
pub use signer::{LocalWalletSigner, SignerError, TypedDataSigner};
pub use simulation::{unix_now, SimulationCoprocessor, SimulationEngine};
pub use traits::{EncryptedInput, FheEngine, MAX_LANES};
pub use types::*;
