// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Public parameter encoding
//!
//! The key distribution service hands out the lane parameters next to the
//! public key. They travel as the Solidity ABI encoding of
//! `(uint256 degree, uint256 plaintext, uint256[] moduli, uint256 variance, string error1_variance)`.

use crate::builder::build_bfv_params_arc;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::U256;
use fhe::bfv::BfvParameters;
use std::sync::Arc;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum EncodingError {
    #[error("Failed to ABI decode bytes: {0}")]
    AbiDecodeFailed(String),
    #[error("Invalid ABI structure: expected tuple")]
    InvalidAbiStructure,
    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
    #[error(transparent)]
    Build(#[from] crate::builder::BuildError),
}

fn params_type() -> DynSolType {
    DynSolType::Tuple(vec![
        DynSolType::Uint(256),
        DynSolType::Uint(256),
        DynSolType::Array(Box::new(DynSolType::Uint(256))),
        DynSolType::Uint(256),
        DynSolType::String,
    ])
}

/// Encodes BFV parameters into ABI bytes.
pub fn encode_bfv_params(params: &BfvParameters) -> Vec<u8> {
    let value = DynSolValue::Tuple(vec![
        DynSolValue::Uint(U256::from(params.degree()), 256),
        DynSolValue::Uint(U256::from(params.plaintext()), 256),
        DynSolValue::Array(
            params
                .moduli()
                .iter()
                .map(|val| DynSolValue::Uint(U256::from(*val), 256))
                .collect(),
        ),
        DynSolValue::Uint(U256::from(params.variance()), 256),
        DynSolValue::String(params.get_error1_variance().to_string()),
    ]);
    value.abi_encode()
}

fn as_u64(value: &DynSolValue, field: &'static str) -> Result<u64, EncodingError> {
    match value {
        DynSolValue::Uint(val, _) => (*val)
            .try_into()
            .map_err(|e| EncodingError::InvalidValue(field, format!("{e}"))),
        _ => Err(EncodingError::InvalidAbiStructure),
    }
}

/// Decodes BFV parameters produced by [`encode_bfv_params`].
pub fn decode_bfv_params_arc(bytes: &[u8]) -> Result<Arc<BfvParameters>, EncodingError> {
    let decoded = params_type()
        .abi_decode(bytes)
        .map_err(|e| EncodingError::AbiDecodeFailed(e.to_string()))?;

    let DynSolValue::Tuple(fields) = decoded else {
        return Err(EncodingError::InvalidAbiStructure);
    };
    let [degree, plaintext, moduli, variance, error1_variance] = fields.as_slice() else {
        return Err(EncodingError::InvalidAbiStructure);
    };

    let degree = as_u64(degree, "degree")?;
    let plaintext = as_u64(plaintext, "plaintext modulus")?;
    let moduli = match moduli {
        DynSolValue::Array(values) => values
            .iter()
            .map(|v| as_u64(v, "modulus"))
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(EncodingError::InvalidAbiStructure),
    };
    let variance = as_u64(variance, "variance")?;
    let error1_variance = match error1_variance {
        DynSolValue::String(val) => val.clone(),
        _ => return Err(EncodingError::InvalidAbiStructure),
    };

    Ok(build_bfv_params_arc(
        degree as usize,
        plaintext,
        &moduli,
        variance as usize,
        Some(&error1_variance),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::LanePreset;

    #[test]
    fn test_encode_decode_roundtrip_presets() {
        for preset in LanePreset::ALL {
            let params = preset.build_arc().unwrap();
            let decoded = decode_bfv_params_arc(&encode_bfv_params(&params)).unwrap();

            assert_eq!(decoded.degree(), params.degree());
            assert_eq!(decoded.plaintext(), params.plaintext());
            assert_eq!(decoded.moduli(), params.moduli());
            assert_eq!(decoded.variance(), params.variance());
            assert_eq!(decoded.get_error1_variance(), params.get_error1_variance());
        }
    }

    #[test]
    fn test_encode_deterministic() {
        let params = LanePreset::InsecureLane512.build_arc().unwrap();
        assert_eq!(encode_bfv_params(&params), encode_bfv_params(&params));
    }

    #[test]
    fn test_decode_invalid_bytes() {
        assert!(matches!(
            decode_bfv_params_arc(&[0u8; 10]),
            Err(EncodingError::AbiDecodeFailed(_))
        ));
    }
}
