//! Encryption codec for location and text fields of shared documents.
//!
//! The codec turns coordinates and short text into versioned, authenticated
//! envelopes for storage in a shared document store, and reverses the transform on
//! read. Reads are permissive: documents written before encryption existed stay
//! readable through the legacy plaintext fields, and anything malformed reads as absent.
//!
//! A review kill-switch in [`CodecConfig`] turns every write into plaintext passthrough
//! tagged with a temporary version marker, so the data can be migrated later.
//!
//! # Failure semantics
//!
//! No codec operation returns an error or panics on bad input. Failures come back as
//! `None` (or an empty field set for writes) and are logged through `tracing`.
//!
//! # Example
//!
//! ```
//! use love2love::codec::{Coordinate, EncryptionCodec};
//! use love2love::config::CodecConfig;
//! use love2love::crypto::InMemoryKeyProvider;
//!
//! let codec = EncryptionCodec::new(CodecConfig::default(), &InMemoryKeyProvider::new())?;
//!
//! let fields = codec.write_location(Coordinate::new(48.8566, 2.3522), "journal_entry");
//! assert_eq!(fields["locationVersion"], "2.0");
//!
//! let record = codec.read_location(&fields).expect("location should decode");
//! assert_eq!((record.latitude, record.longitude), (48.8566, 2.3522));
//! assert!(record.is_encrypted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod location;
pub mod migration;
pub mod text;

pub use self::location::{Coordinate, LocationRecord};
pub use self::migration::{needs_migration, needs_text_migration, MigrationOutcome, MigrationReport};

use crate::config::CodecConfig;
use crate::crypto::{self, SymmetricKey, SymmetricKeyProvider};
use crate::errors::AppResult;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// A stored document: the field map of one record in the shared document store.
pub type Document = Map<String, Value>;

/// Produces and consumes encrypted location and text fields.
///
/// Construct one per process and share it by reference. The key is fetched once at
/// construction and is immutable afterwards, so the codec needs no locking.
pub struct EncryptionCodec {
    key: SymmetricKey,
    config: CodecConfig,
}

impl EncryptionCodec {
    /// Creates a codec, fetching (or generating) the symmetric key from `keys`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Crypto` if the key provider cannot supply a key. There is no
    /// fallback to an ephemeral key.
    pub fn new(config: CodecConfig, keys: &dyn SymmetricKeyProvider) -> AppResult<Self> {
        let key = keys.get_or_create_symmetric_key()?;

        if config.encryption_disabled_for_review {
            info!("Encryption disabled for review: writes will be stored as plaintext");
        }

        Ok(Self { key, config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Whether writes currently skip encryption.
    pub fn is_encryption_disabled(&self) -> bool {
        self.config.encryption_disabled_for_review
    }

    /// Seals `plaintext` into a base64 envelope, or `None` if sealing failed.
    pub fn encrypt(&self, plaintext: &[u8]) -> Option<String> {
        match crypto::seal(&self.key, plaintext) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                warn!(error = %e, "Failed to seal payload");
                None
            }
        }
    }

    /// Opens a base64 envelope, or `None` if it is malformed, tampered with, or was
    /// sealed under a different key.
    pub fn decrypt(&self, envelope: &str) -> Option<Zeroizing<Vec<u8>>> {
        match crypto::open(&self.key, envelope) {
            Ok(plaintext) => Some(plaintext),
            Err(e) => {
                debug!(error = %e, "Failed to open envelope");
                None
            }
        }
    }
}

/// Returns the string value of `field` if it is present and non-empty.
pub(crate) fn non_empty_str<'a>(document: &'a Document, field: &str) -> Option<&'a str> {
    document
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
