//! Constants used throughout the crate.
//!
//! This module contains all constants used by the codec, the image cache and the
//! operator CLI, organized into logical groups. Storage field names live here so the
//! document shapes written and read by the codec cannot drift apart.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "love2love";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "Maintenance tool for the Love2Love encryption codec and image cache";

// Logging Configuration
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "love2love";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";

// Configuration Keys & Environment Variables
/// Environment variable for the image cache directory.
pub const ENV_VAR_CACHE_DIR: &str = "LOVE2LOVE_CACHE_DIR";
/// Environment variable for the memory tier budget, in MiB.
pub const ENV_VAR_MEMORY_BUDGET_MB: &str = "LOVE2LOVE_MEMORY_BUDGET_MB";
/// Environment variable for the disk tier JPEG quality.
pub const ENV_VAR_JPEG_QUALITY: &str = "LOVE2LOVE_JPEG_QUALITY";
/// Environment variable for the app-review encryption kill-switch.
pub const ENV_VAR_ENCRYPTION_DISABLED_FOR_REVIEW: &str = "LOVE2LOVE_ENCRYPTION_DISABLED_FOR_REVIEW";
/// Environment variable for the secure-storage service name.
pub const ENV_VAR_KEYRING_SERVICE: &str = "LOVE2LOVE_KEYRING_SERVICE";
/// Environment variable selecting the log output format.
pub const ENV_VAR_LOG_FORMAT: &str = "LOVE2LOVE_LOG_FORMAT";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default cache directory, relative to the user's home directory.
pub const DEFAULT_CACHE_SUBDIR: &str = ".cache/love2love/images";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Secure Storage
/// Default service name under which the symmetric key is stored.
pub const DEFAULT_KEYRING_SERVICE: &str = "love2love";
/// Account name of the symmetric key entry.
pub const KEYRING_KEY_ACCOUNT: &str = "location_encryption_key";

// Envelope Format
/// Symmetric key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;
/// AES-GCM initialization vector length in bytes.
pub const IV_SIZE: usize = 12;
/// AES-GCM authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

// Format Versions
/// Current envelope format version for location and text payloads.
pub const CURRENT_FORMAT_VERSION: &str = "2.0";
/// Version reported for records read from the legacy plaintext shape.
pub const LEGACY_FORMAT_VERSION: &str = "1.0";
/// Version marker written while the review kill-switch is active.
pub const TEMP_UNENCRYPTED_VERSION: &str = "1.0-temp";

// Migration Status Values
/// Encrypted fields plus legacy location mirror.
pub const STATUS_HYBRID: &str = "hybrid";
/// Plaintext written under the review kill-switch; migratable later.
pub const STATUS_UNENCRYPTED_TEMP: &str = "unencrypted_temp";
/// Encrypted text plus legacy text mirror.
pub const STATUS_HYBRID_TEXT: &str = "hybrid_text";

// Document Field Names
pub const FIELD_ENCRYPTED_LOCATION: &str = "encryptedLocation";
pub const FIELD_LOCATION_VERSION: &str = "locationVersion";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_LATITUDE: &str = "latitude";
pub const FIELD_LONGITUDE: &str = "longitude";
pub const FIELD_HAS_LOCATION: &str = "hasLocation";
pub const FIELD_MIGRATION_STATUS: &str = "migrationStatus";
pub const FIELD_CLIENT_VERSION: &str = "clientVersion";
pub const FIELD_MIGRATED_AT: &str = "migratedAt";
pub const FIELD_ENCRYPTED_TEXT: &str = "encryptedText";
pub const FIELD_TEXT_VERSION: &str = "textVersion";
pub const FIELD_TEXT_LEGACY: &str = "text_legacy";
pub const FIELD_TEXT: &str = "text";

// Image Cache
/// Default memory tier budget in MiB.
pub const DEFAULT_MEMORY_BUDGET_MB: usize = 100;
/// Default JPEG quality for the disk tier.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
/// File extension of derived-key disk entries.
pub const CACHE_FILE_EXTENSION: &str = ".jpg";
/// Maximum length of a derived cache key.
pub const MAX_CACHE_KEY_LEN: usize = 200;
/// Number of hex characters used for query and overflow hash suffixes.
pub const KEY_HASH_SUFFIX_LEN: usize = 16;
/// Bytes per mebibyte.
pub const BYTES_PER_MB: usize = 1024 * 1024;

// File System Parameters
/// Default POSIX permissions for the cache directory (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
