// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_simple_tracing;
use crate::helpers::{ensure_hex_zeroizing, parse_topic_id, select_network, Context};
use crate::launch::LaunchArgs;
use crate::{demo, encrypt, keys, launch, mode, serve_keys, tally, topics, vote};
use alloy::primitives::{Address, U256};
use anyhow::Result;
use av_config::{load_config, ClientConfig};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, instrument, Level};
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(name = "auroravote")]
#[command(about = "Encrypt confidential ballots and decrypt vote aggregates", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Network to use, by name or chain id
    #[arg(short, long, global = true, default_value = "hardhat")]
    network: String,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `auroravote -vvv` will give
    /// you trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        setup_simple_tracing(self.log_level());

        let config = self.load_config()?;
        info!("Config loaded from: {:?}", config.config_file());

        let context = || Context::new(&config, select_network(&config, &self.network)?);
        match self.command {
            Commands::Mode { chain_id } => {
                let chain_id = match chain_id {
                    Some(chain_id) => chain_id,
                    None => select_network(&config, &self.network)?.chain_id,
                };
                mode::execute(chain_id)
            }
            Commands::Keys => keys::execute(&context()?).await?,
            Commands::Topics => topics::execute(&context()?).await?,
            Commands::Launch { topic, private_key } => {
                launch::execute(&context()?, &topic, &private_key).await?
            }
            Commands::Encrypt {
                contract,
                user,
                vector,
            } => encrypt::execute(&context()?, contract, user, &vector).await?,
            Commands::Vote {
                topic,
                choice,
                private_key,
            } => vote::execute(&context()?, topic, choice, &private_key).await?,
            Commands::Tally { topic, private_key } => {
                tally::execute(&context()?, topic, &private_key).await?
            }
            Commands::Demo { options, choices } => {
                demo::execute(&config, options, &choices).await?
            }
            Commands::ServeKeys { host, port } => {
                serve_keys::execute(&context()?, &host, port).await?
            }
        }

        Ok(())
    }

    pub fn load_config(&self) -> Result<ClientConfig> {
        let config = load_config(self.config.clone())?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print whether a chain runs in simulation or live mode
    Mode {
        /// Chain id to classify instead of the selected network
        #[arg(long)]
        chain_id: Option<u64>,
    },

    /// Fetch the FHE public key material of the selected network
    Keys,

    /// List the topics of the hub contract
    Topics,

    /// Create a topic on the hub contract
    Launch {
        #[command(flatten)]
        topic: LaunchArgs,

        #[arg(long = "private-key", value_parser = ensure_hex_zeroizing)]
        private_key: Zeroizing<String>,
    },

    /// Encrypt a vector of 32 bit lanes and print the handles and input proof
    Encrypt {
        /// Contract the ballot is bound to
        #[arg(long)]
        contract: Address,

        /// Account that will submit the ballot
        #[arg(long)]
        user: Address,

        /// Comma separated lane values, eg. `0,0,1,0`
        #[arg(long, value_delimiter = ',', required = true)]
        vector: Vec<u64>,
    },

    /// Cast an encrypted one-hot ballot on a topic of the hub contract
    Vote {
        #[arg(long, value_parser = parse_topic_id)]
        topic: U256,

        /// Zero based option index
        #[arg(long)]
        choice: usize,

        #[arg(long = "private-key", value_parser = ensure_hex_zeroizing)]
        private_key: Zeroizing<String>,
    },

    /// Decrypt and print the per option counts of a topic
    Tally {
        #[arg(long, value_parser = parse_topic_id)]
        topic: U256,

        /// Key of an account allowed to decrypt the aggregate
        #[arg(long = "private-key", value_parser = ensure_hex_zeroizing)]
        private_key: Zeroizing<String>,
    },

    /// Run a complete vote against the in-process simulation
    Demo {
        /// Comma separated option labels
        #[arg(long, value_delimiter = ',', default_value = "Yes,No,Abstain")]
        options: Vec<String>,

        /// Comma separated choices, one ballot each
        #[arg(long, value_delimiter = ',', default_value = "0,0,1")]
        choices: Vec<usize>,
    },

    /// Serve the relayer key proxy endpoint for the selected network
    ServeKeys {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8787)]
        port: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["auroravote", "-vv", "keys"]).unwrap();
        assert_eq!(cli.log_level(), Level::DEBUG);
        let cli = Cli::try_parse_from(["auroravote", "-q", "keys"]).unwrap();
        assert_eq!(cli.log_level(), Level::ERROR);
        assert!(Cli::try_parse_from(["auroravote", "-q", "-v", "keys"]).is_err());
    }

    #[test]
    fn test_encrypt_arguments() {
        let cli = Cli::try_parse_from([
            "auroravote",
            "--network",
            "sepolia",
            "encrypt",
            "--contract",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            "--user",
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            "--vector",
            "0,0,1,0",
        ])
        .unwrap();
        assert_eq!(cli.network, "sepolia");
        match cli.command {
            Commands::Encrypt { vector, .. } => assert_eq!(vector, vec![0, 0, 1, 0]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_launch_arguments() {
        let cli = Cli::try_parse_from([
            "auroravote",
            "launch",
            "--name",
            "Lunch",
            "--options",
            "Pizza,Sushi,Tacos",
            "--duration",
            "600",
            "--private-key",
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        ])
        .unwrap();
        match cli.command {
            Commands::Launch { topic, .. } => {
                assert_eq!(topic.options, vec!["Pizza", "Sushi", "Tacos"]);
                assert_eq!(topic.opens_in, 0);
                assert_eq!(topic.max_per_address, 1);
                assert_eq!(topic.new_topic(10).close_at, 610);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Cli::try_parse_from(["auroravote", "launch", "--name", "x"]).is_err());
    }

    #[test]
    fn test_vote_requires_hex_key() {
        assert!(Cli::try_parse_from([
            "auroravote",
            "vote",
            "--topic",
            "1",
            "--choice",
            "0",
            "--private-key",
            "not-hex",
        ])
        .is_err());
    }
}
