//! Configuration management for the love2love crate.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. The loaded `Config` splits into the two values
//! injected into the components at construction: `CodecConfig` for the encryption codec
//! and `CacheConfig` for the image cache. Nothing reads a process-global flag; tests build
//! these values directly to exercise both kill-switch modes.
//!
//! # Environment Variables
//!
//! - `LOVE2LOVE_CACHE_DIR`: Image cache directory (defaults to ~/.cache/love2love/images)
//! - `LOVE2LOVE_MEMORY_BUDGET_MB`: Memory tier budget in MiB (defaults to 100)
//! - `LOVE2LOVE_JPEG_QUALITY`: Disk tier JPEG quality, 1-100 (defaults to 80)
//! - `LOVE2LOVE_ENCRYPTION_DISABLED_FOR_REVIEW`: Review kill-switch (defaults to off)
//! - `LOVE2LOVE_KEYRING_SERVICE`: Secure-storage service name (defaults to "love2love")
//! - `HOME`: Used for expanding the default cache directory path

use crate::constants::{
    BYTES_PER_MB, CURRENT_FORMAT_VERSION, DEFAULT_CACHE_SUBDIR, DEFAULT_JPEG_QUALITY,
    DEFAULT_KEYRING_SERVICE, DEFAULT_MEMORY_BUDGET_MB, ENV_VAR_CACHE_DIR,
    ENV_VAR_ENCRYPTION_DISABLED_FOR_REVIEW, ENV_VAR_HOME, ENV_VAR_JPEG_QUALITY,
    ENV_VAR_KEYRING_SERVICE, ENV_VAR_MEMORY_BUDGET_MB, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Settings injected into the [`EncryptionCodec`](crate::codec::EncryptionCodec).
///
/// # Examples
///
/// ```
/// use love2love::config::CodecConfig;
///
/// let config = CodecConfig::default();
/// assert!(!config.encryption_disabled_for_review);
/// assert_eq!(config.format_version, "2.0");
///
/// let review = CodecConfig::for_review();
/// assert!(review.encryption_disabled_for_review);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// When set, writes skip encryption and emit the legacy plaintext shape tagged with a
    /// temporary version marker. Exists so a build can pass platform app review.
    pub encryption_disabled_for_review: bool,

    /// Envelope format version stamped on encrypted location and text fields.
    pub format_version: String,

    /// Client version tag written alongside encrypted fields.
    pub client_version: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            encryption_disabled_for_review: false,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl CodecConfig {
    /// Default settings with the review kill-switch turned on.
    pub fn for_review() -> Self {
        Self {
            encryption_disabled_for_review: true,
            ..Self::default()
        }
    }
}

/// Settings injected into the [`ImageCache`](crate::cache::ImageCache).
#[derive(Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory holding `<key>.jpg` entries and widget files.
    pub cache_dir: PathBuf,

    /// Upper bound on the summed decoded size of images held in memory.
    pub memory_budget_bytes: usize,

    /// JPEG quality used when writing the disk tier.
    pub jpeg_quality: u8,
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("cache_dir", &REDACTED_PLACEHOLDER)
            .field("memory_budget_bytes", &self.memory_budget_bytes)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish()
    }
}

impl CacheConfig {
    /// Creates a cache configuration for `cache_dir` with the default budget and quality.
    ///
    /// # Examples
    ///
    /// ```
    /// use love2love::config::CacheConfig;
    ///
    /// let config = CacheConfig::new("/tmp/l2l-images");
    /// assert_eq!(config.memory_budget_bytes, 100 * 1024 * 1024);
    /// assert_eq!(config.jpeg_quality, 80);
    /// ```
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_MB * BYTES_PER_MB,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Overrides the memory tier budget.
    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget_bytes = bytes;
        self
    }

    /// Checks that the cache configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the cache directory is empty or relative, the memory
    /// budget is zero, or the JPEG quality is outside 1-100.
    pub fn validate(&self) -> AppResult<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Cache directory path is empty".to_string()));
        }

        if !self.cache_dir.is_absolute() {
            return Err(AppError::Config(
                "Cache directory must be an absolute path".to_string(),
            ));
        }

        if self.memory_budget_bytes == 0 {
            return Err(AppError::Config(
                "Memory budget must be greater than zero".to_string(),
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AppError::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        Ok(())
    }
}

/// Configuration for the love2love components and CLI.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use love2love::config::{CacheConfig, CodecConfig, Config};
///
/// let config = Config {
///     codec: CodecConfig::default(),
///     cache: CacheConfig::new("/var/cache/love2love"),
///     keyring_service: "love2love".to_string(),
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Codec settings, including the review kill-switch.
    pub codec: CodecConfig,

    /// Image cache settings.
    pub cache: CacheConfig,

    /// Service name under which the symmetric key is kept in secure storage.
    pub keyring_service: String,
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The cache directory path is expanded with `shellexpand`, so `~` and
    /// `$VAR` references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The cache directory path expansion fails
    /// - A numeric variable cannot be parsed
    /// - The kill-switch variable is not a recognised boolean
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use love2love::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Caching images in {}", config.cache.cache_dir.display()),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        let cache_dir_str = env::var(ENV_VAR_CACHE_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_CACHE_SUBDIR)
        });

        let expanded_path = shellexpand::full(&cache_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let cache_dir = PathBuf::from(expanded_path.into_owned());

        let memory_budget_mb: usize =
            parse_env_or(ENV_VAR_MEMORY_BUDGET_MB, DEFAULT_MEMORY_BUDGET_MB)?;
        let jpeg_quality: u8 = parse_env_or(ENV_VAR_JPEG_QUALITY, DEFAULT_JPEG_QUALITY)?;

        let encryption_disabled_for_review = match env::var(ENV_VAR_ENCRYPTION_DISABLED_FOR_REVIEW)
        {
            Ok(raw) => parse_flag(ENV_VAR_ENCRYPTION_DISABLED_FOR_REVIEW, &raw)?,
            Err(_) => false,
        };

        let keyring_service =
            env::var(ENV_VAR_KEYRING_SERVICE).unwrap_or_else(|_| DEFAULT_KEYRING_SERVICE.to_string());

        Ok(Config {
            codec: CodecConfig {
                encryption_disabled_for_review,
                ..CodecConfig::default()
            },
            cache: CacheConfig {
                cache_dir,
                memory_budget_bytes: memory_budget_mb.saturating_mul(BYTES_PER_MB),
                jpeg_quality,
            },
            keyring_service,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the cache settings are invalid or the keyring
    /// service name is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use love2love::config::{CacheConfig, CodecConfig, Config};
    ///
    /// let invalid = Config {
    ///     codec: CodecConfig::default(),
    ///     cache: CacheConfig::new("relative/dir"),
    ///     keyring_service: "love2love".to_string(),
    /// };
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        self.cache.validate()?;

        if self.keyring_service.trim().is_empty() {
            return Err(AppError::Config(
                "Keyring service name cannot be empty".to_string(),
            ));
        }

        if self.codec.format_version.is_empty() {
            return Err(AppError::Config("Format version cannot be empty".to_string()));
        }

        Ok(())
    }
}

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> AppResult<T> {
    match env::var(var) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            AppError::Config(format!("{} must be a non-negative integer, got '{}'", var, raw))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(var: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!(
            "{} must be a boolean (true/false), got '{}'",
            var, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_impl_redacts_cache_dir() {
        let config = CacheConfig::new("/home/username/private/cache");

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains(REDACTED_PLACEHOLDER));
        assert!(!debug_output.contains("/home/username/private/cache"));
        assert!(debug_output.contains("jpeg_quality"));
    }

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        for raw in ["1", "true", "TRUE", "yes", "on", " True "] {
            assert!(parse_flag("X", raw).unwrap(), "{raw} should be true");
        }
        for raw in ["0", "false", "no", "off", ""] {
            assert!(!parse_flag("X", raw).unwrap(), "{raw} should be false");
        }
        assert!(parse_flag("X", "maybe").is_err());
    }

    #[test]
    fn test_cache_validate() {
        assert!(CacheConfig::new("/abs/path").validate().is_ok());
        assert!(CacheConfig::new("").validate().is_err());
        assert!(CacheConfig::new("rel/path").validate().is_err());
        assert!(CacheConfig::new("/abs/path")
            .with_memory_budget(0)
            .validate()
            .is_err());

        let mut config = CacheConfig::new("/abs/path");
        config.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_rejects_empty_keyring_service() {
        let config = Config {
            codec: CodecConfig::default(),
            cache: CacheConfig::new("/abs/path"),
            keyring_service: "  ".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_codec_config_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.format_version, CURRENT_FORMAT_VERSION);
        assert!(!config.encryption_disabled_for_review);
        assert!(!config.client_version.is_empty());
    }
}
