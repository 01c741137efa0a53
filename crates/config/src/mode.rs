// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain id of the local development network that runs against the
/// in-process coprocessor.
pub const SIMULATION_CHAIN_ID: u64 = 31337;

/// How a call reaches the FHE machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Local and deterministic. Never touches the network.
    Simulation,
    /// Remote key distribution and remote decryption coordination.
    Live,
}

impl NetworkMode {
    pub fn is_simulation(&self) -> bool {
        matches!(self, NetworkMode::Simulation)
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkMode::Simulation => write!(f, "simulation"),
            NetworkMode::Live => write!(f, "live"),
        }
    }
}

/// Maps a chain id to its operating mode. Total over `u64`.
pub fn select_mode(chain_id: u64) -> NetworkMode {
    if chain_id == SIMULATION_CHAIN_ID {
        NetworkMode::Simulation
    } else {
        NetworkMode::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_local_chain_is_simulation() {
        assert_eq!(select_mode(31337), NetworkMode::Simulation);
        assert!(select_mode(SIMULATION_CHAIN_ID).is_simulation());
    }

    #[test]
    fn test_everything_else_is_live() {
        for id in [0, 1, 31336, 31338, 11155111, u64::MAX] {
            assert_eq!(select_mode(id), NetworkMode::Live, "chain {id}");
        }
    }

    #[test]
    fn test_select_mode_is_stable() {
        for id in [0, 31337, 11155111, u64::MAX] {
            let first = select_mode(id);
            for _ in 0..16 {
                assert_eq!(select_mode(id), first);
            }
        }
    }

    proptest! {
        #[test]
        fn only_the_local_chain_simulates(chain_id in any::<u64>()) {
            prop_assert_eq!(
                select_mode(chain_id).is_simulation(),
                chain_id == SIMULATION_CHAIN_ID
            );
            prop_assert_eq!(select_mode(chain_id), select_mode(chain_id));
        }
    }
}
