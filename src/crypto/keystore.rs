//! Symmetric key providers.
//!
//! The codec never touches secure storage directly: it asks a
//! [`SymmetricKeyProvider`] for the per-install key once, at construction. The key is
//! generated lazily on first request and persisted; later requests return the stored key.

use crate::constants::{KEYRING_KEY_ACCOUNT, KEY_SIZE};
use crate::errors::CryptoError;
use aes_gcm::aead::{rand_core::RngCore, OsRng};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// A 256-bit AES key, scrubbed from memory on drop.
#[derive(Clone)]
pub struct SymmetricKey(Zeroizing<[u8; KEY_SIZE]>);

impl SymmetricKey {
    /// Generate a key from the operating system's CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
        OsRng.fill_bytes(bytes.as_mut());
        Self(bytes)
    }

    /// Build a key from raw bytes, which must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Source of the per-install symmetric key.
///
/// Implementations must be idempotent: the first call generates and persists a key,
/// every later call returns that same key.
pub trait SymmetricKeyProvider {
    fn get_or_create_symmetric_key(&self) -> Result<SymmetricKey, CryptoError>;
}

/// Key provider backed by the platform secure store (macOS Keychain, Windows
/// Credential Manager, Secret Service on Linux) through the `keyring` crate.
///
/// The key is stored base64-encoded under `(service, "location_encryption_key")`.
/// There is no export path: losing the entry makes previously sealed data unreadable.
pub struct KeyringKeyProvider {
    service: String,
}

impl KeyringKeyProvider {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CryptoError> {
        keyring::Entry::new(&self.service, KEYRING_KEY_ACCOUNT)
            .map_err(|e| CryptoError::KeyUnavailable(format!("keyring init: {}", e)))
    }
}

impl SymmetricKeyProvider for KeyringKeyProvider {
    fn get_or_create_symmetric_key(&self) -> Result<SymmetricKey, CryptoError> {
        let entry = self.entry()?;

        match entry.get_password() {
            Ok(encoded) => {
                let bytes = Zeroizing::new(STANDARD.decode(encoded.trim()).map_err(|e| {
                    CryptoError::InvalidKey(format!("stored key is not valid base64: {}", e))
                })?);
                debug!(service = %self.service, "loaded symmetric key from secure storage");
                SymmetricKey::from_slice(&bytes)
            }
            Err(keyring::Error::NoEntry) => {
                let key = SymmetricKey::generate();
                let encoded = Zeroizing::new(STANDARD.encode(key.as_bytes()));
                entry.set_password(&encoded).map_err(|e| {
                    CryptoError::KeyUnavailable(format!("store generated key: {}", e))
                })?;
                info!(service = %self.service, "generated and stored new symmetric key");
                Ok(key)
            }
            Err(e) => Err(CryptoError::KeyUnavailable(format!("load key: {}", e))),
        }
    }
}

/// In-process key provider for tests and tooling.
///
/// Generates a key on first request and returns it for the lifetime of the provider.
/// [`InMemoryKeyProvider::with_key`] seeds a fixed key, which simulates a second
/// device holding the same key.
#[derive(Default)]
pub struct InMemoryKeyProvider {
    key: Mutex<Option<SymmetricKey>>,
}

impl InMemoryKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: SymmetricKey) -> Self {
        Self {
            key: Mutex::new(Some(key)),
        }
    }
}

impl SymmetricKeyProvider for InMemoryKeyProvider {
    fn get_or_create_symmetric_key(&self) -> Result<SymmetricKey, CryptoError> {
        let mut slot = self
            .key
            .lock()
            .map_err(|_| CryptoError::KeyUnavailable("key slot poisoned".to_string()))?;
        Ok(slot.get_or_insert_with(SymmetricKey::generate).clone())
    }
}
