// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::builder::build_bfv_params_from_set_arc;
use crate::constants::{insecure_512, secure_8192};
use fhe::bfv::BfvParameters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// BFV presets for vote lane encryption.
///
/// A ballot is a vector of lanes, each lane a 32 bit unsigned count encoded
/// as the constant coefficient of one plaintext polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LanePreset {
    /// Insecure lane parameters (degree 512) - DO NOT USE IN PRODUCTION
    ///
    /// Small enough for unit tests and local relayer emulation.
    InsecureLane512,
    /// Secure lane parameters (degree 8192)
    #[default]
    SecureLane8192,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfvParamSet {
    pub degree: usize,
    pub plaintext_modulus: u64,
    pub moduli: &'static [u64],
    pub variance: usize,
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("Unknown BFV preset: {0}")]
    UnknownPreset(String),
    #[error("Failed to build BFV parameters for {0}: {1}")]
    BuildFailed(&'static str, String),
}

impl LanePreset {
    pub const ALL: [LanePreset; 2] = [LanePreset::InsecureLane512, LanePreset::SecureLane8192];

    pub const fn name(&self) -> &'static str {
        match self {
            LanePreset::InsecureLane512 => "INSECURE_LANE_512",
            LanePreset::SecureLane8192 => "SECURE_LANE_8192",
        }
    }

    pub const fn param_set(&self) -> BfvParamSet {
        match self {
            LanePreset::InsecureLane512 => BfvParamSet {
                degree: insecure_512::DEGREE,
                plaintext_modulus: insecure_512::PLAINTEXT_MODULUS,
                moduli: insecure_512::MODULI,
                variance: insecure_512::VARIANCE,
            },
            LanePreset::SecureLane8192 => BfvParamSet {
                degree: secure_8192::DEGREE,
                plaintext_modulus: secure_8192::PLAINTEXT_MODULUS,
                moduli: secure_8192::MODULI,
                variance: secure_8192::VARIANCE,
            },
        }
    }

    pub fn build_arc(&self) -> Result<Arc<BfvParameters>, PresetError> {
        build_bfv_params_from_set_arc(self.param_set())
            .map_err(|e| PresetError::BuildFailed(self.name(), e.to_string()))
    }
}

impl fmt::Display for LanePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LanePreset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanePreset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}
