// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{address, b256, Address, B256};
use alloy::signers::local::PrivateKeySigner;
use av_config::ProtocolAddresses;
use av_engine::LocalWalletSigner;

/// First contract a fresh local node deploys.
pub const HUB: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

/// Well known development accounts #1 to #3.
const VOTER_KEYS: [B256; 3] = [
    b256!("0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"),
    b256!("0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a"),
    b256!("0x7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6"),
];

pub fn voter_wallet(index: usize) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&VOTER_KEYS[index % VOTER_KEYS.len()])
        .expect("development key is valid")
}

pub fn voter(index: usize) -> LocalWalletSigner {
    LocalWalletSigner::new(voter_wallet(index))
}

/// Protocol addresses for a network served by [`crate::MockRelayer`].
pub fn mock_protocol(chain_id: u64) -> ProtocolAddresses {
    ProtocolAddresses {
        acl: Address::repeat_byte(0xa1),
        kms_verifier: Address::repeat_byte(0xa2),
        input_verifier: Address::repeat_byte(0xa3),
        decryption_verifier: Address::repeat_byte(0xa4),
        input_verification_verifier: Address::repeat_byte(0xa5),
        gateway_chain_id: chain_id,
    }
}
