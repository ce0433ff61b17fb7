//! Error handling utilities for the love2love crate.
//!
//! This module provides the central error type `AppError`, the domain error enums it
//! wraps, and the convenience alias `AppResult`.
//!
//! Most public codec and cache operations deliberately do not return these errors: a
//! failed decryption or a missing cache file surfaces as `None`, and the failure is
//! logged. The typed errors flow through the envelope primitives, the key providers,
//! the disk tier and the fallible constructors.

use std::io;
use thiserror::Error;

/// Represents specific error cases that can occur during cryptographic operations.
///
/// # Examples
///
/// ```
/// use love2love::errors::CryptoError;
///
/// let error = CryptoError::KeyUnavailable("no secure storage backend".to_string());
/// let message = format!("{}", error);
/// assert!(message.contains("secure storage"));
/// assert!(message.contains("no secure storage backend"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The symmetric key could not be loaded from or persisted to secure storage.
    #[error("Symmetric key unavailable from secure storage: {0}. Check that the platform keychain or secret service is running and accessible.")]
    KeyUnavailable(String),

    /// Key material has the wrong length or encoding.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// The AEAD seal operation failed.
    #[error("Encryption failed")]
    EncryptionFailed,

    /// The stored envelope is not valid base64 or is too short to hold an IV and tag.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Authentication failed: the envelope was tampered with or sealed under another key.
    #[error("Decryption failed - data may be corrupted, tampered, or encrypted with a different key")]
    DecryptionFailed,
}

/// Represents specific error cases that can occur in the image cache.
///
/// # Examples
///
/// ```
/// use love2love::errors::CacheError;
///
/// let error = CacheError::InvalidWidgetName("../escape.jpg".to_string());
/// assert!(format!("{}", error).contains("../escape.jpg"));
/// ```
#[derive(Debug, Error)]
pub enum CacheError {
    /// The disk tier worker needs a Tokio runtime and none is running.
    #[error("No async runtime available for the disk cache worker. Construct the cache from within a Tokio runtime.")]
    RuntimeUnavailable,

    /// Widget filenames must be a single path component.
    #[error("Invalid widget filename '{0}': must be a plain file name without path separators")]
    InvalidWidgetName(String),

    /// Image encoding or decoding failed.
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// Represents all possible errors that can occur in the love2love crate.
///
/// This enum is the central error type, with variants for the different error
/// categories. Domain errors convert into it through `From`.
///
/// Note: This type does not implement `Clone` to avoid losing error context when
/// cloning `std::io::Error` values.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use love2love::errors::AppError;
///
/// let error = AppError::Config("Cache directory path is empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Cache directory path is empty");
/// ```
///
/// Converting from an IO error:
/// ```
/// use love2love::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to cryptographic operations or key management.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Errors related to the image cache.
    #[error("Image cache error: {0}")]
    Cache(#[from] CacheError),

    /// Errors reading or writing JSON documents.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use love2love::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Config("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
