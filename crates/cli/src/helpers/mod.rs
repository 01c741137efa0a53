// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, bail, Context, Result};
use av_client::VoteClient;
use av_config::{ClientConfig, NetworkConfig};
use av_engine::SimulationCoprocessor;
use av_transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

pub mod telemetry;

/// Parse to a Zeroizing String
pub fn parse_zeroizing(s: &str) -> Result<Zeroizing<String>> {
    Ok(Zeroizing::new(s.to_string()))
}

/// Ensure hex is of the form 0x12435687abcdef...
pub fn ensure_hex_zeroizing(s: &str) -> Result<Zeroizing<String>> {
    parse_zeroizing(ensure_hex(s)?)
}

fn ensure_hex(s: &str) -> Result<&str> {
    if !s.starts_with("0x") {
        bail!("hex value must start with '0x'")
    }
    if !s[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("private key must only contain hex characters [0-9a-fA-F]");
    }
    hex::decode(&s[2..])?.zeroize();
    Ok(s)
}

pub fn wallet(private_key: &Zeroizing<String>) -> Result<PrivateKeySigner> {
    private_key
        .parse()
        .map_err(|e| anyhow!("invalid private key: {e}"))
}

pub fn parse_topic_id(s: &str) -> Result<U256> {
    s.parse().context("topic id must be an unsigned integer")
}

/// Picks a configured network by name, or by chain id when `name` is numeric.
pub fn select_network(config: &ClientConfig, name: &str) -> Result<NetworkConfig> {
    let by_chain = name.parse::<u64>().ok().and_then(|id| config.network(id));
    by_chain
        .or_else(|| config.network_by_name(name))
        .cloned()
        .ok_or_else(|| {
            let known: Vec<_> = config.networks().iter().map(|n| n.name.as_str()).collect();
            anyhow!("unknown network '{name}', configured: {}", known.join(", "))
        })
}

pub fn hub_contract(network: &NetworkConfig) -> Result<Address> {
    network
        .hub_contract
        .ok_or_else(|| anyhow!("network '{}' has no hub_contract configured", network.name))
}

pub fn rpc_url(network: &NetworkConfig) -> Result<&str> {
    network
        .rpc_url
        .as_deref()
        .ok_or_else(|| anyhow!("network '{}' has no rpc_url configured", network.name))
}

/// Everything a command needs to talk to one network.
pub struct Context {
    pub network: NetworkConfig,
    pub transport: Arc<dyn HttpTransport>,
    pub coprocessor: Arc<SimulationCoprocessor>,
    pub client: VoteClient,
}

impl Context {
    pub fn new(config: &ClientConfig, network: NetworkConfig) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
        let coprocessor = Arc::new(SimulationCoprocessor::new(config.simulation().clone())?);
        let client =
            VoteClient::from_config(config, &network, transport.clone(), coprocessor.clone());
        Ok(Self {
            network,
            transport,
            coprocessor,
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_hex() {
        let key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
        assert!(ensure_hex_zeroizing(key).is_ok());
        assert!(wallet(&ensure_hex_zeroizing(key).unwrap()).is_ok());
        assert!(ensure_hex_zeroizing("59c6").is_err());
        assert!(ensure_hex_zeroizing("0xzz").is_err());
        assert!(ensure_hex_zeroizing("0x123").is_err());
    }

    #[test]
    fn test_select_network() {
        let config = ClientConfig::default();
        assert_eq!(select_network(&config, "hardhat").unwrap().chain_id, 31337);
        assert_eq!(select_network(&config, "11155111").unwrap().name, "sepolia");
        let err = select_network(&config, "mainnet").unwrap_err().to_string();
        assert!(err.contains("hardhat, sepolia"), "{err}");
    }

    #[test]
    fn test_missing_hub_contract() {
        assert!(hub_contract(&NetworkConfig::hardhat()).is_err());
        assert!(rpc_url(&NetworkConfig::hardhat()).is_ok());
    }
}
