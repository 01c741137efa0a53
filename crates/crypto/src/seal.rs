// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use k256::{ecdh::diffie_hellman, elliptic_curve::sec1::ToEncodedPoint, PublicKey, SecretKey};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Length of a compressed SEC1 secp256k1 point.
pub const PUBLIC_KEY_LEN: usize = 33;
const NONCE_LEN: usize = 12;
const KDF_DOMAIN: &[u8] = b"auroravote/seal/v1";

/// Derives the AES-256 key shared between the sender's one-time key and the
/// recipient.
///
/// The digest covers both public keys so a sealed value cannot be replayed
/// under a different sender key.
fn derive_key(
    secret: &SecretKey,
    peer: &PublicKey,
    sender_public: &[u8],
    recipient_public: &[u8],
) -> Zeroizing<Vec<u8>> {
    let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let mut hasher = Sha256::new();
    hasher.update(KDF_DOMAIN);
    hasher.update(shared.raw_secret_bytes());
    hasher.update(sender_public);
    hasher.update(recipient_public);
    Zeroizing::new(hasher.finalize().to_vec())
}

pub(crate) fn compressed(public: &PublicKey) -> Vec<u8> {
    public.to_encoded_point(true).as_bytes().to_vec()
}

/// Seals `plaintext` to a recipient's secp256k1 public key.
///
/// The sealing process:
/// 1. Generates a one-time secp256k1 key
/// 2. Derives an AES-256 key from the ECDH secret with SHA-256
/// 3. Encrypts with AES-256-GCM under a random nonce
/// 4. Returns `[one-time public key (33)][nonce (12)][ciphertext]`
///
/// Only the holder of the matching secret key can open the result with
/// [`open`].
pub fn seal(recipient_public: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let recipient = PublicKey::from_sec1_bytes(recipient_public)
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    let recipient_public = compressed(&recipient);

    let one_time = SecretKey::random(&mut OsRng);
    let sender_public = compressed(&one_time.public_key());
    let key = derive_key(&one_time, &recipient, &sender_public, &recipient_public);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::Seal)?;
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::Seal)?;

    let mut output = Vec::with_capacity(PUBLIC_KEY_LEN + NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&sender_public);
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Opens a value produced by [`seal`].
///
/// Fails when the payload is truncated, was sealed to another key, or has
/// been modified.
pub fn open(secret: &SecretKey, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    const HEADER_LEN: usize = PUBLIC_KEY_LEN + NONCE_LEN;
    if sealed.len() < HEADER_LEN {
        return Err(CryptoError::Malformed(format!(
            "sealed value is {} bytes, expected at least {HEADER_LEN}",
            sealed.len()
        )));
    }

    let sender_public = &sealed[..PUBLIC_KEY_LEN];
    let nonce = Nonce::from_slice(&sealed[PUBLIC_KEY_LEN..HEADER_LEN]);
    let ciphertext = &sealed[HEADER_LEN..];

    let sender = PublicKey::from_sec1_bytes(sender_public)
        .map_err(|_| CryptoError::Malformed("sender key is not a curve point".into()))?;
    let recipient_public = compressed(&secret.public_key());
    let key = derive_key(secret, &sender, sender_public, &recipient_public);

    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::Open)?;
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::Open)?;
    Ok(Zeroizing::new(plaintext))
}
