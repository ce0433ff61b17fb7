//! Two-tier image cache.
//!
//! Images are looked up by a key derived from their remote locator: first in a
//! byte-bounded LRU memory tier, then as `<key>.jpg` in the cache directory. A disk hit
//! is promoted into memory. Disk writes, deletions and clears run on a background
//! worker; the memory tier is the authoritative fast path and disk only speeds up warm
//! restarts. The disk tier has no quota and grows until [`ImageCache::clear`] is called.
//!
//! A separate widget namespace addresses files in the same directory by a literal,
//! caller-chosen filename so a home-screen widget process can find them without
//! reproducing the key derivation.
//!
//! # Example
//!
//! ```no_run
//! use love2love::cache::{DecodedImage, ImageCache};
//! use love2love::config::CacheConfig;
//!
//! # async fn run(image: DecodedImage) -> love2love::AppResult<()> {
//! let cache = ImageCache::new(&CacheConfig::new("/var/cache/love2love/images"))?;
//!
//! let url = "https://cdn.example.com/users/42/avatar.jpg";
//! cache.put(image, url);
//! assert!(cache.get(url).is_some());
//!
//! cache.flush().await;
//! println!("{}", cache.size_report());
//! # Ok(())
//! # }
//! ```

pub mod bitmap;
pub mod disk;
pub mod key;
pub mod memory;

pub use self::bitmap::DecodedImage;
pub use self::key::{cache_key, CacheKey};

use self::disk::DiskTier;
use self::memory::MemoryTier;
use crate::config::CacheConfig;
use crate::errors::{AppResult, CacheError};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Hit and miss counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct Counters {
    memory_hits: AtomicU64,
    disk_hits: AtomicU64,
    misses: AtomicU64,
}

/// Memory budget and actual disk usage of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReport {
    /// Human-readable memory budget, derived from the configured ceiling.
    pub memory_budget: String,
    /// Bytes currently used by files in the cache directory.
    pub disk_usage_bytes: u64,
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Memory cache: {} (budget), Disk cache: {}",
            self.memory_budget,
            format_bytes(self.disk_usage_bytes)
        )
    }
}

/// Formats a byte count with binary units, e.g. `1536` as `"1.5 KB"`.
///
/// # Examples
///
/// ```
/// use love2love::cache::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(100 * 1024 * 1024), "100.0 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Checks that a widget filename is a single, ordinary path component.
fn validate_widget_name(file_name: &str) -> Result<(), CacheError> {
    let ordinary = !file_name.is_empty()
        && file_name != "."
        && file_name != ".."
        && !file_name.contains(['/', '\\', '\0']);
    if ordinary {
        Ok(())
    } else {
        Err(CacheError::InvalidWidgetName(file_name.to_string()))
    }
}

/// Memory + disk image cache keyed by remote locator.
///
/// Construct one per process inside a Tokio runtime and share it by reference; every
/// method takes `&self`.
pub struct ImageCache {
    memory: MemoryTier,
    disk: DiskTier,
    counters: Counters,
}

impl ImageCache {
    /// Creates the cache directory if needed and starts the disk worker.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache(CacheError::RuntimeUnavailable)` outside a Tokio runtime
    /// and `AppError::Io` if the cache directory cannot be created.
    pub fn new(config: &CacheConfig) -> AppResult<Self> {
        let disk = DiskTier::open(&config.cache_dir, config.jpeg_quality)?;
        debug!(
            memory_budget_bytes = config.memory_budget_bytes,
            "Image cache ready"
        );

        Ok(Self {
            memory: MemoryTier::new(config.memory_budget_bytes),
            disk,
            counters: Counters::default(),
        })
    }

    /// Returns the image cached for `locator`, promoting disk hits into memory.
    pub fn get(&self, locator: &str) -> Option<Arc<DecodedImage>> {
        let key = cache_key(locator);

        if let Some(image) = self.memory.get(&key) {
            self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
            return Some(image);
        }

        let Some(bytes) = self.disk.read(&key.file_name()) else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        match DecodedImage::decode_jpeg(&bytes) {
            Ok(image) => {
                let image = Arc::new(image);
                self.memory.insert(key, Arc::clone(&image));
                self.counters.disk_hits.fetch_add(1, Ordering::Relaxed);
                Some(image)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt disk cache entry, treating as miss");
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Caches `image` for `locator`.
    ///
    /// The memory tier is updated before this returns. The JPEG encode and disk write
    /// are queued and happen later.
    pub fn put(&self, image: impl Into<DecodedImage>, locator: &str) {
        let key = cache_key(locator);
        let image = Arc::new(image.into());

        self.memory.insert(key.clone(), Arc::clone(&image));
        self.disk.queue_write(key.file_name(), image);
    }

    /// Drops `locator` from memory now and queues deletion of its disk file.
    pub fn evict(&self, locator: &str) {
        let key = cache_key(locator);
        self.memory.remove(&key);
        self.disk.queue_remove(key.file_name());
    }

    /// Empties the memory tier now and queues removal and re-creation of the cache
    /// directory. Writes queued after this call land after the directory is cleared.
    pub fn clear(&self) {
        self.memory.clear();
        self.disk.queue_clear();
    }

    /// Resolves once every disk operation queued so far has completed.
    pub async fn flush(&self) {
        self.disk.flush().await;
    }

    /// Stores `image` under the literal `file_name` for the widget extension.
    ///
    /// Invalid names (empty, `.`/`..`, or containing a path separator) are logged and
    /// ignored. The caller is responsible for avoiding names that collide with derived
    /// cache keys.
    pub fn cache_image_for_widget(&self, image: impl Into<DecodedImage>, file_name: &str) {
        if let Err(e) = validate_widget_name(file_name) {
            warn!(error = %e, "Refusing to cache widget image");
            return;
        }
        self.disk
            .queue_write(file_name.to_string(), Arc::new(image.into()));
    }

    /// Reads the widget image stored under the literal `file_name`, bypassing memory.
    pub fn get_cached_widget_image(&self, file_name: &str) -> Option<DecodedImage> {
        if let Err(e) = validate_widget_name(file_name) {
            warn!(error = %e, "Refusing to read widget image");
            return None;
        }

        let bytes = self.disk.read(file_name)?;
        match DecodedImage::decode(&bytes) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(file = file_name, error = %e, "Corrupt widget image");
                None
            }
        }
    }

    /// Reports the configured memory budget and the bytes currently on disk.
    pub fn size_report(&self) -> SizeReport {
        SizeReport {
            memory_budget: format_bytes(self.memory.budget_bytes() as u64),
            disk_usage_bytes: self.disk.usage_bytes(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.counters.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.counters.disk_hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
        }
    }

    /// Whether `locator` is currently held in the memory tier.
    pub fn is_in_memory(&self, locator: &str) -> bool {
        self.memory.contains(&cache_key(locator))
    }

    /// Summed decoded size of the images held in memory.
    pub fn memory_usage_bytes(&self) -> usize {
        self.memory.used_bytes()
    }

    pub fn cache_dir(&self) -> &Path {
        self.disk.dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_validate_widget_name() {
        assert!(validate_widget_name("partner_photo.jpg").is_ok());
        assert!(validate_widget_name("widget-bg.png").is_ok());

        for bad in ["", ".", "..", "../escape.jpg", "a/b.jpg", "a\\b.jpg"] {
            assert!(
                matches!(validate_widget_name(bad), Err(CacheError::InvalidWidgetName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_size_report_display() {
        let report = SizeReport {
            memory_budget: "100.0 MB".to_string(),
            disk_usage_bytes: 2048,
        };
        assert_eq!(
            report.to_string(),
            "Memory cache: 100.0 MB (budget), Disk cache: 2.0 KB"
        );
    }
}
