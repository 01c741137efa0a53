// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::presets::BfvParamSet;
use fhe::bfv::{BfvParameters, BfvParametersBuilder};
use std::sync::Arc;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Failed to set error1_variance: {0}")]
    Error1Variance(String),
    #[error("Failed to build BFV parameters: {0}")]
    Build(String),
}

pub fn build_bfv_params_from_set_arc(
    param_set: BfvParamSet,
) -> Result<Arc<BfvParameters>, BuildError> {
    build_bfv_params_arc(
        param_set.degree,
        param_set.plaintext_modulus,
        param_set.moduli,
        param_set.variance,
        None,
    )
}

pub fn build_bfv_params_arc(
    degree: usize,
    plaintext_modulus: u64,
    moduli: &[u64],
    variance: usize,
    error1_variance: Option<&str>,
) -> Result<Arc<BfvParameters>, BuildError> {
    let mut builder = BfvParametersBuilder::new();
    builder
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli(moduli)
        .set_variance(variance);

    if let Some(error1) = error1_variance {
        builder
            .set_error1_variance_str(error1)
            .map_err(|e| BuildError::Error1Variance(e.to_string()))?;
    }

    builder
        .build_arc()
        .map_err(|e| BuildError::Build(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{defaults, secure_8192};
    use num_bigint::BigUint;

    #[test]
    fn test_build_secure_lane_params() {
        let params = build_bfv_params_arc(
            secure_8192::DEGREE,
            secure_8192::PLAINTEXT_MODULUS,
            secure_8192::MODULI,
            secure_8192::VARIANCE,
            None,
        )
        .unwrap();
        assert_eq!(params.degree(), secure_8192::DEGREE);
        assert_eq!(params.plaintext(), secure_8192::PLAINTEXT_MODULUS);
        assert_eq!(params.moduli(), secure_8192::MODULI);
        assert_eq!(
            params.get_error1_variance(),
            &BigUint::from(defaults::ERROR1_VARIANCE)
        );
    }

    #[test]
    fn test_explicit_error1_variance() {
        let params = build_bfv_params_arc(
            secure_8192::DEGREE,
            secure_8192::PLAINTEXT_MODULUS,
            secure_8192::MODULI,
            secure_8192::VARIANCE,
            Some("20"),
        )
        .unwrap();
        assert_eq!(params.get_error1_variance(), &BigUint::from(20u32));

        assert!(build_bfv_params_arc(
            secure_8192::DEGREE,
            secure_8192::PLAINTEXT_MODULUS,
            secure_8192::MODULI,
            secure_8192::VARIANCE,
            Some("twenty"),
        )
        .is_err());
    }

    #[test]
    fn test_build_rejects_bad_moduli() {
        assert!(build_bfv_params_arc(512, 0xffffee001, &[], 3, None).is_err());
    }
}
