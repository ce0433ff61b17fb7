//! Cryptographic primitives for the encryption codec.
//!
//! This module provides the authenticated envelope format and the symmetric key
//! providers the codec is built on.
//!
//! # Module Structure
//!
//! - `envelope`: AES-256-GCM seal/open of `base64(IV || ciphertext || tag)` envelopes
//! - `keystore`: `SymmetricKeyProvider` trait with secure-storage and in-memory backends
//!
//! # Example
//!
//! ```
//! use love2love::crypto::{open, seal, InMemoryKeyProvider, SymmetricKeyProvider};
//!
//! let provider = InMemoryKeyProvider::new();
//! let key = provider.get_or_create_symmetric_key()?;
//!
//! let envelope = seal(&key, b"48.8566,2.3522")?;
//! let plaintext = open(&key, &envelope)?;
//! assert_eq!(plaintext.as_slice(), b"48.8566,2.3522");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod envelope;
pub mod keystore;

pub use self::envelope::{open, seal};
pub use self::keystore::{
    InMemoryKeyProvider, KeyringKeyProvider, SymmetricKey, SymmetricKeyProvider,
};
