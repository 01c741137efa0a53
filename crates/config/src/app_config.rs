// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, resolve_config_path};
use crate::network::{NetworkConfig, SimulationFixture};
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::{env, path::PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "auroravote.config.yaml";
pub const ENV_PREFIX: &str = "AURORAVOTE_";

/// Upper bound the KMS accepts for a user decryption window.
pub const MAX_VALIDITY_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthorizationConfig {
    /// How long a decryption authorization stays valid, in days.
    pub validity_days: u32,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            validity_days: MAX_VALIDITY_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    networks: Vec<NetworkConfig>,
    #[serde(default)]
    authorization: AuthorizationConfig,
    #[serde(default)]
    simulation: SimulationFixture,
    #[serde(default)]
    config_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            networks: vec![NetworkConfig::hardhat(), NetworkConfig::sepolia()],
            authorization: AuthorizationConfig::default(),
            simulation: SimulationFixture::default(),
            config_file: None,
        }
    }
}

impl ClientConfig {
    pub fn networks(&self) -> &[NetworkConfig] {
        &self.networks
    }

    pub fn network(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    pub fn network_by_name(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.name == name)
    }

    pub fn validity_days(&self) -> u32 {
        self.authorization.validity_days
    }

    pub fn simulation(&self) -> &SimulationFixture {
        &self.simulation
    }

    pub fn config_file(&self) -> Option<&PathBuf> {
        self.config_file.as_ref()
    }

    pub fn validate(&self) -> Result<()> {
        let days = self.authorization.validity_days;
        if days == 0 || days > MAX_VALIDITY_DAYS {
            bail!("authorization.validity_days must be within 1..={MAX_VALIDITY_DAYS}, got {days}");
        }

        let mut seen = HashSet::new();
        for network in &self.networks {
            if !seen.insert(network.chain_id) {
                bail!("chain id {} is configured more than once", network.chain_id);
            }
            network.validate().map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("auroravote")
    }
}

/// Loads the client configuration.
///
/// Defaults are overlaid by the YAML file and then by `AURORAVOTE_` prefixed
/// environment variables (`__` separates nested keys). A file passed on the
/// command line must exist; otherwise a missing file just means defaults.
pub fn load_config(cli_file: Option<String>) -> Result<ClientConfig> {
    let explicit = cli_file.is_some();
    let resolved_config_path = resolve_config_path(
        find_in_parent,
        env::current_dir()?,
        OsDirs::config_dir(),
        DEFAULT_CONFIG_NAME,
        cli_file.map(PathBuf::from),
    );

    let mut figment = Figment::from(Serialized::defaults(ClientConfig::default()));
    if resolved_config_path.exists() {
        debug!(path = %resolved_config_path.display(), "loading configuration file");
        let yaml = std::fs::read_to_string(&resolved_config_path)
            .context("Configuration file could not be read")?;
        figment = figment.merge(Yaml::string(&yaml));
    } else if explicit {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", resolved_config_path.display()),
        )
        .into());
    }

    let mut config: ClientConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("Could not parse configuration")?;

    if resolved_config_path.exists() {
        config.config_file = Some(resolved_config_path);
    }
    config.validate()?;
    Ok(config)
}
