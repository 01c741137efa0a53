// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{hub_contract, rpc_url, wallet, Context};
use anyhow::Result;
use av_client::{EvmVoteLedger, NewTopic};
use av_engine::unix_now;
use clap::Args;
use tracing::info;
use zeroize::Zeroizing;

#[derive(Debug, Args, Clone)]
pub struct LaunchArgs {
    /// Topic title
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub details: String,

    /// Comma separated option labels, in ballot lane order
    #[arg(long, value_delimiter = ',', required = true)]
    pub options: Vec<String>,

    /// Seconds from now until voting opens
    #[arg(long, default_value_t = 0)]
    pub opens_in: u64,

    /// Seconds voting stays open
    #[arg(long, default_value_t = 86_400)]
    pub duration: u64,

    /// Ballots each address may cast, 0 for unlimited
    #[arg(long, default_value_t = 1)]
    pub max_per_address: u32,
}

impl LaunchArgs {
    pub fn new_topic(&self, now: u64) -> NewTopic {
        let open_at = now.saturating_add(self.opens_in);
        NewTopic {
            name: self.name.clone(),
            details: self.details.clone(),
            options: self.options.clone(),
            open_at,
            close_at: open_at.saturating_add(self.duration),
            max_per_address: self.max_per_address,
        }
    }
}

pub async fn execute(
    context: &Context,
    args: &LaunchArgs,
    private_key: &Zeroizing<String>,
) -> Result<()> {
    let signer = wallet(private_key)?;
    let owner = signer.address();
    let hub = hub_contract(&context.network)?;
    let ledger =
        EvmVoteLedger::connect_with_wallet(rpc_url(&context.network)?, hub, signer).await?;

    let new = args.new_topic(unix_now());
    let (open_at, close_at) = (new.open_at, new.close_at);
    let topic_id = ledger.launch_topic(new).await?;

    info!(topic = %topic_id, %owner, "topic launched");
    println!("Launched topic {topic_id} '{}', open {open_at}..{close_at}", args.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(opens_in: u64, duration: u64) -> LaunchArgs {
        LaunchArgs {
            name: "Lunch".to_string(),
            details: String::new(),
            options: vec!["Pizza".to_string(), "Sushi".to_string()],
            opens_in,
            duration,
            max_per_address: 1,
        }
    }

    #[test]
    fn test_window_from_now() {
        let topic = args(60, 3600).new_topic(1_000);
        assert_eq!(topic.open_at, 1_060);
        assert_eq!(topic.close_at, 4_660);
        assert!(topic.validate().is_ok());
    }

    #[test]
    fn test_empty_window_is_refused() {
        assert!(args(0, 0).new_topic(1_000).validate().is_err());
    }
}
