// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Confidential vote client: builds encrypted one-hot ballots and decrypts
//! vote aggregates after the voter authorizes it with a typed data signature.

mod ballot;
mod client;
mod engine_factory;
mod error;
pub mod ledger;
mod result;

pub use av_config::{select_mode, NetworkMode};
pub use av_engine::{LocalWalletSigner, SignerError, TypedDataSigner};
pub use ballot::{BallotError, OneHotVote};
pub use client::VoteClient;
pub use engine_factory::EngineFactory;
pub use error::VoteError;
pub use ledger::{EvmVoteLedger, LedgerError, NewTopic, SimulatedVoteHub, Topic, VoteLedger};
pub use result::{resolve_counts, AggregateResult};
