// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::seal::{compressed, open};
use crate::CryptoError;
use k256::SecretKey;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

/// Single use secp256k1 keypair a user decryption is sealed to.
///
/// The secret never leaves this value and is wiped when it is dropped.
pub struct EphemeralKeypair {
    secret: SecretKey,
    public: Vec<u8>,
}

impl EphemeralKeypair {
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        let public = compressed(&secret.public_key());
        Self { secret, public }
    }

    /// Compressed SEC1 public key, 33 bytes.
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.public))
    }

    /// Opens a value sealed to this keypair.
    pub fn open(&self, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        open(&self.secret, sealed)
    }
}

impl fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeypair")
            .field("public", &self.public_key_hex())
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seal;

    #[test]
    fn test_fresh_keys() {
        let a = EphemeralKeypair::generate();
        let b = EphemeralKeypair::generate();
        assert_eq!(a.public_key().len(), 33);
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_open_sealed_value() {
        let keypair = EphemeralKeypair::generate();
        let sealed = seal(keypair.public_key(), &[0, 0, 0, 2]).unwrap();
        assert_eq!(keypair.open(&sealed).unwrap().as_slice(), &[0, 0, 0, 2]);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let keypair = EphemeralKeypair::generate();
        let debug = format!("{keypair:?}");
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains(&keypair.public_key_hex()));
    }
}
