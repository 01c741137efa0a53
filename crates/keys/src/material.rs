// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use av_config::SimulationFixture;
use std::fmt;

/// FHE public key and public parameters for one operation.
///
/// Fetched per call and dropped with it; nothing here is cached.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub public_key_id: String,
    pub public_key: Vec<u8>,
    pub public_params_id: String,
    pub public_params: Vec<u8>,
}

impl KeyMaterial {
    /// Key material of the simulated deployment. The "key" is the protocol
    /// addresses it was derived from and the params carry the chain id.
    pub fn simulation(fixture: &SimulationFixture) -> Self {
        let public_key = [fixture.acl, fixture.input_verifier, fixture.kms_verifier]
            .iter()
            .flat_map(|a| a.as_slice().to_vec())
            .collect();
        Self {
            public_key_id: format!("simulation-pk-{:x}", fixture.acl),
            public_key,
            public_params_id: format!("simulation-crs-{}", fixture.chain_id),
            public_params: fixture.chain_id.to_be_bytes().to_vec(),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key_id", &self.public_key_id)
            .field("public_key_len", &self.public_key.len())
            .field("public_params_id", &self.public_params_id)
            .field("public_params_len", &self.public_params.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_material_is_derived_from_fixture() {
        let fixture = SimulationFixture::default();
        let material = KeyMaterial::simulation(&fixture);
        assert_eq!(material.public_key.len(), 60);
        assert_eq!(&material.public_key[..20], fixture.acl.as_slice());
        assert_eq!(&material.public_key[40..], fixture.kms_verifier.as_slice());
        assert_eq!(material.public_params, 31337u64.to_be_bytes().to_vec());
        assert_eq!(material, KeyMaterial::simulation(&fixture));
    }

    #[test]
    fn test_debug_hides_bytes() {
        let material = KeyMaterial::simulation(&SimulationFixture::default());
        let debug = format!("{material:?}");
        assert!(debug.contains("public_key_len: 60"));
    }
}
