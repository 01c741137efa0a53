// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{EngineError, Handle};
use alloy::primitives::{keccak256, Address, Bytes, Signature, B256, U256};

const SIGNATURE_LEN: usize = 65;

/// Proof attached to an encrypted input.
///
/// Layout: `[numHandles u8][numSigners u8][handles 32*n][signatures 65*m][extraData]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputProof {
    pub handles: Vec<Handle>,
    pub signatures: Vec<Signature>,
    pub extra_data: Bytes,
}

impl InputProof {
    pub fn to_bytes(&self) -> Result<Bytes, EngineError> {
        let handles = u8::try_from(self.handles.len())
            .map_err(|_| EngineError::Encryption("too many handles for one input".into()))?;
        let signers = u8::try_from(self.signatures.len())
            .map_err(|_| EngineError::Encryption("too many input signers".into()))?;

        let mut out = Vec::with_capacity(
            2 + self.handles.len() * 32
                + self.signatures.len() * SIGNATURE_LEN
                + self.extra_data.len(),
        );
        out.push(handles);
        out.push(signers);
        for handle in &self.handles {
            out.extend_from_slice(handle.as_slice());
        }
        for signature in &self.signatures {
            out.extend_from_slice(&signature.as_bytes());
        }
        out.extend_from_slice(&self.extra_data);
        Ok(out.into())
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, EngineError> {
        let malformed =
            |what: &str| EngineError::InvalidInput(format!("malformed input proof: {what}"));

        let (&num_handles, rest) = bytes.split_first().ok_or_else(|| malformed("empty"))?;
        let (&num_signers, rest) = rest.split_first().ok_or_else(|| malformed("no signer count"))?;

        let handles_len = num_handles as usize * 32;
        let signatures_len = num_signers as usize * SIGNATURE_LEN;
        if rest.len() < handles_len + signatures_len {
            return Err(malformed("truncated"));
        }

        let (handle_bytes, rest) = rest.split_at(handles_len);
        let (signature_bytes, extra) = rest.split_at(signatures_len);

        let handles = handle_bytes
            .chunks_exact(32)
            .map(|chunk| Handle::new(B256::from_slice(chunk)))
            .collect();
        let signatures = signature_bytes
            .chunks_exact(SIGNATURE_LEN)
            .map(|chunk| Signature::try_from(chunk).map_err(|_| malformed("bad signature")))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            handles,
            signatures,
            extra_data: Bytes::copy_from_slice(extra),
        })
    }
}

/// Digest input verifiers sign: the handles bound to the submitting user,
/// the receiving contract and the chain.
pub fn input_digest(handles: &[Handle], user: Address, contract: Address, chain_id: u64) -> B256 {
    let mut packed = Vec::with_capacity(handles.len() * 32 + 20 + 20 + 32);
    for handle in handles {
        packed.extend_from_slice(handle.as_slice());
    }
    packed.extend_from_slice(user.as_slice());
    packed.extend_from_slice(contract.as_slice());
    packed.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    keccak256(&packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    #[test]
    fn test_layout() {
        let signer = PrivateKeySigner::random();
        let handles = vec![Handle::new(B256::repeat_byte(1)), Handle::new(B256::repeat_byte(2))];
        let digest = input_digest(
            &handles,
            address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
            address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            31337,
        );
        let proof = InputProof {
            handles: handles.clone(),
            signatures: vec![signer.sign_hash_sync(&digest).unwrap()],
            extra_data: Bytes::new(),
        };

        let bytes = proof.to_bytes().unwrap();
        assert_eq!(bytes.len(), 2 + 64 + 65);
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[1], 1);
        assert_eq!(&bytes[2..34], handles[0].as_slice());

        let parsed = InputProof::parse(&bytes).unwrap();
        assert_eq!(parsed.handles, handles);
        assert_eq!(
            parsed.signatures[0]
                .recover_address_from_prehash(&digest)
                .unwrap(),
            signer.address()
        );
    }

    #[test]
    fn test_digest_binds_addresses() {
        let handles = vec![Handle::new(B256::repeat_byte(1))];
        let a = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let b = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
        assert_ne!(input_digest(&handles, a, b, 1), input_digest(&handles, b, a, 1));
        assert_ne!(input_digest(&handles, a, b, 1), input_digest(&handles, a, b, 2));
    }

    #[test]
    fn test_truncated() {
        assert!(InputProof::parse(&[]).is_err());
        assert!(InputProof::parse(&[1, 0, 0xff]).is_err());
        assert!(InputProof::parse(&[0, 1]).is_err());
    }
}
