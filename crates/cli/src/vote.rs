// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{hub_contract, rpc_url, wallet, Context};
use alloy::primitives::U256;
use anyhow::{bail, Result};
use av_client::{EvmVoteLedger, OneHotVote, VoteLedger};
use av_engine::unix_now;
use tracing::info;
use zeroize::Zeroizing;

pub async fn execute(
    context: &Context,
    topic_id: U256,
    choice: usize,
    private_key: &Zeroizing<String>,
) -> Result<()> {
    let signer = wallet(private_key)?;
    let voter = signer.address();
    let hub = hub_contract(&context.network)?;
    let ledger =
        EvmVoteLedger::connect_with_wallet(rpc_url(&context.network)?, hub, signer).await?;

    let topic = ledger.topic(topic_id).await?;
    if !topic.is_open(unix_now()) {
        bail!(
            "topic {topic_id} is open from {} to {}",
            topic.open_at,
            topic.close_at
        );
    }
    let (used, max) = ledger.quota(topic_id, voter).await?;
    if max != 0 && used >= max {
        bail!("{voter} already cast {used} of {max} ballots on topic {topic_id}");
    }

    let vote = OneHotVote::new(topic.options.len(), choice)?;
    let bundle = context.client.build_cipher(hub, voter, vote.lanes()).await?;
    ledger.push_cipher(topic_id, &bundle).await?;

    info!(topic = %topic_id, %voter, "ballot cast");
    println!(
        "Voted '{}' on topic {topic_id} ({})",
        topic.options[vote.choice()],
        topic.name
    );
    Ok(())
}
