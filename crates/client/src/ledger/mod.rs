// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! The vote hub contract as seen by the client: topic metadata, aggregate
//! handles and ballot submission.

mod evm;
mod simulated;

pub use evm::*;
pub use simulated::*;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use av_engine::{CipherBundle, EngineError, Handle};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Topic {0} does not exist")]
    UnknownTopic(U256),

    #[error("Ballot rejected: {0}")]
    Rejected(String),

    #[error("Ledger RPC failed: {0}")]
    Rpc(String),
}

impl From<EngineError> for LedgerError {
    fn from(value: EngineError) -> Self {
        LedgerError::Rejected(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: U256,
    pub name: String,
    pub details: String,
    /// Option labels. Aggregate handle `i` counts option `i`.
    pub options: Vec<String>,
    pub open_at: u64,
    pub close_at: u64,
    pub published: bool,
    pub owner: Address,
}

/// Parameters of `launchTopic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopic {
    pub name: String,
    pub details: String,
    pub options: Vec<String>,
    pub open_at: u64,
    pub close_at: u64,
    /// Zero means unlimited ballots per address.
    pub max_per_address: u32,
}

impl NewTopic {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.options.is_empty() {
            return Err(LedgerError::Rejected("a topic needs options".into()));
        }
        if self.close_at <= self.open_at {
            return Err(LedgerError::Rejected("topic closes before it opens".into()));
        }
        Ok(())
    }
}

impl Topic {
    pub fn is_open(&self, now: u64) -> bool {
        self.open_at <= now && now < self.close_at
    }
}

#[async_trait]
pub trait VoteLedger: Send + Sync {
    async fn topic(&self, topic_id: U256) -> Result<Topic, LedgerError>;

    /// Per option aggregate handles, in option order. Empty until the first
    /// ballot is counted.
    async fn aggregate_handles(&self, topic_id: U256) -> Result<Vec<Handle>, LedgerError>;

    async fn push_cipher(&self, topic_id: U256, bundle: &CipherBundle) -> Result<(), LedgerError>;
}
