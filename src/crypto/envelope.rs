//! AES-256-GCM envelope format.
//!
//! Envelope wire format, base64 (standard alphabet, padded):
//!   [ IV (12 bytes) | ciphertext | tag (16 bytes) ]
//!
//! A fresh random IV is drawn for every seal, so sealing the same plaintext twice
//! yields two different envelopes.

use crate::constants::{IV_SIZE, TAG_SIZE};
use crate::crypto::keystore::SymmetricKey;
use crate::errors::CryptoError;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

/// Seal `plaintext` under `key` and return the base64 envelope.
pub fn seal(key: &SymmetricKey, plaintext: &[u8]) -> Result<String, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::InvalidKey("AES-256 requires a 32-byte key".to_string()))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut sealed = Vec::with_capacity(IV_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(sealed))
}

/// Open a base64 envelope produced by [`seal`].
///
/// Fails with `MalformedEnvelope` when the string is not base64 or the decoded bytes
/// cannot hold an IV plus a tag, and with `DecryptionFailed` when authentication fails.
pub fn open(key: &SymmetricKey, envelope: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let sealed = STANDARD
        .decode(envelope.trim())
        .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid base64: {}", e)))?;

    if sealed.len() < IV_SIZE + TAG_SIZE {
        return Err(CryptoError::MalformedEnvelope(format!(
            "envelope is {} bytes, need at least {}",
            sealed.len(),
            IV_SIZE + TAG_SIZE
        )));
    }

    let (iv, ciphertext) = sealed.split_at(IV_SIZE);
    let nonce = Nonce::from_slice(iv);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::InvalidKey("AES-256 requires a 32-byte key".to_string()))?;

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}
