// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{hub_contract, rpc_url, wallet, Context};
use alloy::primitives::U256;
use anyhow::Result;
use av_client::{
    resolve_counts, AggregateResult, EvmVoteLedger, LocalWalletSigner, TypedDataSigner, VoteLedger,
};
use zeroize::Zeroizing;

pub async fn execute(
    context: &Context,
    topic_id: U256,
    private_key: &Zeroizing<String>,
) -> Result<()> {
    let signer = LocalWalletSigner::from(wallet(private_key)?);
    let hub = hub_contract(&context.network)?;
    let ledger = EvmVoteLedger::connect(rpc_url(&context.network)?, hub).await?;

    let topic = ledger.topic(topic_id).await?;
    let handles = ledger.aggregate_handles(topic_id).await?;
    let result = if handles.is_empty() {
        println!("Topic {topic_id} ({}) has no ballots yet", topic.name);
        AggregateResult::default()
    } else {
        context
            .client
            .decrypt_aggregate(hub, &handles, signer.address(), &signer)
            .await?
    };

    print_counts(
        &topic.options,
        &resolve_counts(&topic.options, &handles, &result),
    );
    Ok(())
}

pub fn print_counts(options: &[String], counts: &[u64]) {
    let width = options.iter().map(String::len).max().unwrap_or_default();
    for (option, count) in options.iter().zip(counts) {
        println!("{option:<width$}  {count}");
    }
}
