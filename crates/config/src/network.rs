// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::mode::{select_mode, NetworkMode, SIMULATION_CHAIN_ID};
use alloy_primitives::{address, b256, Address, B256};
use serde::{Deserialize, Serialize};
use url::Url;

/// Size class of the public parameters requested from the key service.
pub const DEFAULT_PARAMS_CLASS: &str = "2048";

fn default_params_class() -> String {
    DEFAULT_PARAMS_CLASS.to_string()
}

/// Where a live network publishes its FHE public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum KeySource {
    /// The relayer `keyurl` document listing key and parameter download urls.
    Keyurl { url: String },
    /// A proxy that answers with base64 encoded key material in one payload.
    Proxy { url: String },
}

impl KeySource {
    pub fn url(&self) -> &str {
        match self {
            KeySource::Keyurl { url } | KeySource::Proxy { url } => url,
        }
    }
}

/// Protocol contracts a live network's coprocessor and KMS are bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ProtocolAddresses {
    pub acl: Address,
    pub kms_verifier: Address,
    pub input_verifier: Address,
    /// `verifyingContract` of the decryption EIP-712 domain.
    pub decryption_verifier: Address,
    pub input_verification_verifier: Address,
    pub gateway_chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: Option<String>,
    /// Deployed `AuroraVoteHub` contract.
    pub hub_contract: Option<Address>,
    pub relayer_url: Option<String>,
    pub key_source: Option<KeySource>,
    #[serde(default = "default_params_class")]
    pub params_class: String,
    pub protocol: Option<ProtocolAddresses>,
}

impl NetworkConfig {
    pub fn mode(&self) -> NetworkMode {
        select_mode(self.chain_id)
    }

    pub fn hardhat() -> Self {
        Self {
            name: "hardhat".to_string(),
            chain_id: SIMULATION_CHAIN_ID,
            rpc_url: Some("http://localhost:8545".to_string()),
            hub_contract: None,
            relayer_url: None,
            key_source: None,
            params_class: default_params_class(),
            protocol: None,
        }
    }

    /// Sepolia entry pointing at the public testnet relayer.
    ///
    /// Not usable as is: the live engine needs `protocol` addresses from the
    /// config file, and the relayer behind `key_source` must serve BFV keys
    /// and parameters. The hosted relayer serves TFHE keys, so override
    /// `relayer_url` and `key_source` with a BFV relayer as well.
    pub fn sepolia() -> Self {
        Self {
            name: "sepolia".to_string(),
            chain_id: 11155111,
            rpc_url: None,
            hub_contract: None,
            relayer_url: Some("https://relayer.testnet.zama.cloud".to_string()),
            key_source: Some(KeySource::Keyurl {
                url: "https://relayer.testnet.zama.cloud/v1/keyurl".to_string(),
            }),
            params_class: default_params_class(),
            protocol: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("rpc_url", &self.rpc_url),
            ("relayer_url", &self.relayer_url),
        ] {
            if let Some(value) = value {
                Url::parse(value)
                    .map_err(|e| format!("network '{}': invalid {field}: {e}", self.name))?;
            }
        }
        if let Some(source) = &self.key_source {
            Url::parse(source.url())
                .map_err(|e| format!("network '{}': invalid key_source url: {e}", self.name))?;
        }
        if self.params_class.is_empty() {
            return Err(format!("network '{}': params_class is empty", self.name));
        }
        Ok(())
    }
}

/// Addresses and keys of the local protocol deployment used in simulation.
///
/// Passed explicitly to whatever needs it; there is no global copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SimulationFixture {
    pub chain_id: u64,
    pub acl: Address,
    pub input_verifier: Address,
    pub kms_verifier: Address,
    /// Key the simulated coprocessor signs input proofs with. Public test key.
    pub input_signer_key: B256,
}

impl SimulationFixture {
    pub fn protocol(&self) -> ProtocolAddresses {
        ProtocolAddresses {
            acl: self.acl,
            kms_verifier: self.kms_verifier,
            input_verifier: self.input_verifier,
            decryption_verifier: self.kms_verifier,
            input_verification_verifier: self.input_verifier,
            gateway_chain_id: self.chain_id,
        }
    }
}

impl Default for SimulationFixture {
    fn default() -> Self {
        Self {
            chain_id: SIMULATION_CHAIN_ID,
            acl: address!("0x50157CFfD6bBFA2DECe204a89ec419c23ef5755D"),
            input_verifier: address!("0x901F8942346f7AB3a01F6D7613119Bca447Bb030"),
            kms_verifier: address!("0x1364cBBf2cDF5032C47d8226a6f6FBD2AFCDacAC"),
            input_signer_key: b256!(
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_modes() {
        assert_eq!(NetworkConfig::hardhat().mode(), NetworkMode::Simulation);
        assert_eq!(NetworkConfig::sepolia().mode(), NetworkMode::Live);
    }

    #[test]
    fn test_key_source_yaml() {
        let source: KeySource = serde_yaml::from_str(
            r#"
type: proxy
url: "http://localhost:3000/api/relayer-keys"
"#,
        )
        .unwrap();
        assert_eq!(
            source,
            KeySource::Proxy {
                url: "http://localhost:3000/api/relayer-keys".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut network = NetworkConfig::sepolia();
        assert!(network.validate().is_ok());
        network.relayer_url = Some("not a url".to_string());
        assert!(network.validate().is_err());
    }

    #[test]
    fn test_fixture_protocol_uses_local_chain() {
        let fixture = SimulationFixture::default();
        let protocol = fixture.protocol();
        assert_eq!(protocol.gateway_chain_id, SIMULATION_CHAIN_ID);
        assert_eq!(protocol.acl, fixture.acl);
        assert_eq!(protocol.decryption_verifier, fixture.kms_verifier);
    }
}
