// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::tally::print_counts;
use alloy::primitives::{address, Address};
use anyhow::{bail, Result};
use av_client::{
    resolve_counts, LocalWalletSigner, NewTopic, OneHotVote, SimulatedVoteHub, TypedDataSigner,
    VoteClient, VoteLedger,
};
use av_config::{ClientConfig, NetworkConfig, SIMULATION_CHAIN_ID};
use av_engine::{unix_now, SimulationCoprocessor};
use av_transport::ReqwestTransport;
use std::sync::Arc;
use tracing::info;

/// Where the hub lands when deployed first on a fresh local chain.
const DEMO_HUB: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

pub async fn execute(
    config: &ClientConfig,
    options: Vec<String>,
    choices: &[usize],
) -> Result<()> {
    let counts = run(config, options.clone(), choices).await?;
    print_counts(&options, &counts);
    Ok(())
}

/// Launches a topic on an in-process hub, casts one ballot per choice from a
/// fresh wallet each and decrypts the tally as the last voter.
pub async fn run(
    config: &ClientConfig,
    options: Vec<String>,
    choices: &[usize],
) -> Result<Vec<u64>> {
    let network = config
        .network(SIMULATION_CHAIN_ID)
        .cloned()
        .unwrap_or_else(NetworkConfig::hardhat);
    let coprocessor = Arc::new(SimulationCoprocessor::new(config.simulation().clone())?);
    let client = VoteClient::from_config(
        config,
        &network,
        Arc::new(ReqwestTransport::new()),
        coprocessor.clone(),
    );
    if !client.mode().is_simulation() {
        bail!("network '{}' is not a simulation network", network.name);
    }

    let hub_address = network.hub_contract.unwrap_or(DEMO_HUB);
    let hub = Arc::new(SimulatedVoteHub::new(hub_address, coprocessor));
    let now = unix_now();
    let topic_id = hub
        .launch_topic(
            LocalWalletSigner::random().address(),
            NewTopic {
                name: "Demo".to_string(),
                details: "In-process simulation vote".to_string(),
                options: options.clone(),
                open_at: now,
                close_at: now + 3600,
                max_per_address: 1,
            },
        )
        .await?;

    let mut last_voter = None;
    for choice in choices {
        let voter = LocalWalletSigner::random();
        let vote = OneHotVote::new(options.len(), *choice)?;
        let bundle = client
            .build_cipher(hub_address, voter.address(), vote.lanes())
            .await?;
        hub.connect(voter.address())
            .push_cipher(topic_id, &bundle)
            .await?;
        info!(voter = %voter.address(), choice, "ballot cast");
        last_voter = Some(voter);
    }

    let Some(tallier) = last_voter else {
        return Ok(vec![0; options.len()]);
    };
    let handles = hub
        .connect(tallier.address())
        .aggregate_handles(topic_id)
        .await?;
    let result = client
        .decrypt_aggregate(hub_address, &handles, tallier.address(), &tallier)
        .await?;
    Ok(resolve_counts(&options, &handles, &result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        ["Yes", "No", "Abstain"].map(String::from).to_vec()
    }

    #[tokio::test]
    async fn test_demo_tally() {
        let config = ClientConfig::default();
        assert_eq!(
            run(&config, options(), &[0, 2, 2]).await.unwrap(),
            vec![1, 0, 2]
        );
        assert_eq!(run(&config, options(), &[]).await.unwrap(), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn test_demo_rejects_unknown_choice() {
        let config = ClientConfig::default();
        assert!(run(&config, options(), &[3]).await.is_err());
    }
}
