// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{hub_contract, rpc_url, Context};
use alloy::primitives::U256;
use anyhow::Result;
use av_client::{EvmVoteLedger, Topic, VoteLedger};
use av_engine::unix_now;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStatus {
    Upcoming,
    Open,
    Closed,
    Published,
}

impl TopicStatus {
    pub fn of(topic: &Topic, now: u64) -> Self {
        if topic.published {
            TopicStatus::Published
        } else if now < topic.open_at {
            TopicStatus::Upcoming
        } else if topic.is_open(now) {
            TopicStatus::Open
        } else {
            TopicStatus::Closed
        }
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TopicStatus::Upcoming => "upcoming",
            TopicStatus::Open => "open",
            TopicStatus::Closed => "closed",
            TopicStatus::Published => "published",
        };
        f.write_str(label)
    }
}

pub fn describe(topic: &Topic, now: u64) -> String {
    format!(
        "#{} [{}] {}: {}",
        topic.id,
        TopicStatus::of(topic, now),
        topic.name,
        topic.options.join(" | ")
    )
}

/// Lists every topic of the hub contract.
pub async fn execute(context: &Context) -> Result<()> {
    let hub = hub_contract(&context.network)?;
    let ledger = EvmVoteLedger::connect(rpc_url(&context.network)?, hub).await?;

    let count = ledger.count_topics().await?;
    debug!(%count, hub = %ledger.address(), "listing topics");
    if count.is_zero() {
        println!("No topics on {hub}");
        return Ok(());
    }

    let now = unix_now();
    let mut id = U256::ZERO;
    while id < count {
        let topic = ledger.topic(id).await?;
        println!("{}", describe(&topic, now));
        id += U256::from(1);
    }
    Ok(())
}
