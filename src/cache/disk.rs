//! Disk tier: JPEG files in the cache directory, written by a background worker.
//!
//! Reads are synchronous. Writes, deletions and clears are queued to a single worker
//! task and applied in submission order, so the last `put` for a key wins and a clear
//! always lands before writes queued after it. Failures are logged and dropped; the
//! memory tier stays authoritative.
//!
//! Deletions take effect for readers as soon as they are queued: while a clear is pending
//! every read misses, and while a removal is pending reads of that file miss.

use super::bitmap::DecodedImage;
use crate::errors::{AppResult, CacheError};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use walkdir::WalkDir;

enum DiskOp {
    Write {
        file_name: String,
        image: Arc<DecodedImage>,
    },
    Remove {
        file_name: String,
    },
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Deletions queued but not yet applied by the worker.
#[derive(Default)]
struct Pending {
    clears: usize,
    removals: HashMap<String, usize>,
}

impl Pending {
    fn hides(&self, file_name: &str) -> bool {
        self.clears > 0 || self.removals.contains_key(file_name)
    }

    fn removal_done(&mut self, file_name: &str) {
        if let Some(count) = self.removals.get_mut(file_name) {
            *count -= 1;
            if *count == 0 {
                self.removals.remove(file_name);
            }
        }
    }

    fn clear_done(&mut self) {
        self.clears = self.clears.saturating_sub(1);
    }
}

pub struct DiskTier {
    dir: PathBuf,
    ops: mpsc::UnboundedSender<DiskOp>,
    pending: Arc<Mutex<Pending>>,
}

impl DiskTier {
    /// Creates the cache directory and spawns the writer on the current Tokio runtime.
    pub fn open(dir: &Path, jpeg_quality: u8) -> AppResult<Self> {
        let handle = Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;

        create_cache_dir(dir)?;

        let pending = Arc::new(Mutex::new(Pending::default()));
        let (ops, rx) = mpsc::unbounded_channel();
        handle.spawn(run_worker(
            dir.to_path_buf(),
            jpeg_quality,
            Arc::clone(&pending),
            rx,
        ));

        Ok(Self {
            dir: dir.to_path_buf(),
            ops,
            pending,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Reads the raw bytes of `file_name`, or `None` if it is missing, unreadable, or
    /// has a deletion queued.
    pub fn read(&self, file_name: &str) -> Option<Vec<u8>> {
        if self.is_pending_deletion(file_name) {
            debug!(file = file_name, "Disk cache entry has a deletion queued");
            return None;
        }

        match fs::read(self.path_for(file_name)) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(file = file_name, error = %e, "Failed to read disk cache entry");
                None
            }
        }
    }

    pub fn queue_write(&self, file_name: String, image: Arc<DecodedImage>) {
        self.send(DiskOp::Write { file_name, image });
    }

    pub fn queue_remove(&self, file_name: String) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending.removals.entry(file_name.clone()).or_insert(0) += 1;
        }
        if !self.send(DiskOp::Remove {
            file_name: file_name.clone(),
        }) {
            settle(&self.pending, |pending| pending.removal_done(&file_name));
        }
    }

    pub fn queue_clear(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.clears += 1;
        }
        if !self.send(DiskOp::Clear) {
            settle(&self.pending, Pending::clear_done);
        }
    }

    fn is_pending_deletion(&self, file_name: &str) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.hides(file_name))
            .unwrap_or(false)
    }

    /// Resolves once every operation queued before this call has been applied.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.send(DiskOp::Flush(tx)) {
            let _ = rx.await;
        }
    }

    /// Total size in bytes of all files under the cache directory.
    pub fn usage_bytes(&self) -> u64 {
        WalkDir::new(&self.dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| metadata.len())
            .sum()
    }

    fn send(&self, op: DiskOp) -> bool {
        if self.ops.send(op).is_err() {
            warn!("Disk cache worker has stopped, dropping operation");
            return false;
        }
        true
    }
}

fn create_cache_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use crate::constants::DEFAULT_DIR_PERMISSIONS;
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(DEFAULT_DIR_PERMISSIONS))?;
    }

    Ok(())
}

fn settle(pending: &Mutex<Pending>, done: impl FnOnce(&mut Pending)) {
    if let Ok(mut pending) = pending.lock() {
        done(&mut pending);
    }
}

async fn run_worker(
    dir: PathBuf,
    jpeg_quality: u8,
    pending: Arc<Mutex<Pending>>,
    mut rx: mpsc::UnboundedReceiver<DiskOp>,
) {
    while let Some(op) = rx.recv().await {
        match op {
            DiskOp::Write { file_name, image } => {
                let encoded =
                    tokio::task::spawn_blocking(move || image.encode_jpeg(jpeg_quality)).await;
                let bytes = match encoded {
                    Ok(Ok(bytes)) => bytes,
                    Ok(Err(e)) => {
                        warn!(file = %file_name, error = %e, "Failed to encode cache entry");
                        continue;
                    }
                    Err(e) => {
                        warn!(file = %file_name, error = %e, "Encoder task failed");
                        continue;
                    }
                };
                if let Err(e) = tokio::fs::write(dir.join(&file_name), bytes).await {
                    warn!(file = %file_name, error = %e, "Failed to write cache entry");
                } else {
                    debug!(file = %file_name, "Wrote cache entry to disk");
                }
            }
            DiskOp::Remove { file_name } => {
                match tokio::fs::remove_file(dir.join(&file_name)).await {
                    Ok(()) => debug!(file = %file_name, "Removed cache entry from disk"),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => warn!(file = %file_name, error = %e, "Failed to remove cache entry"),
                }
                settle(&pending, |pending| pending.removal_done(&file_name));
            }
            DiskOp::Clear => {
                if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                    if e.kind() != io::ErrorKind::NotFound {
                        warn!(error = %e, "Failed to remove cache directory");
                    }
                }
                let recreate_dir = dir.clone();
                match tokio::task::spawn_blocking(move || create_cache_dir(&recreate_dir)).await {
                    Ok(Ok(())) => debug!("Cache directory cleared"),
                    Ok(Err(e)) => warn!(error = %e, "Failed to recreate cache directory"),
                    Err(e) => warn!(error = %e, "Cache directory task failed"),
                }
                settle(&pending, Pending::clear_done);
            }
            DiskOp::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Disk cache worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use tempfile::tempdir;

    fn image() -> Arc<DecodedImage> {
        Arc::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]))).into())
    }

    #[test]
    fn test_open_without_runtime_fails() {
        let temp_dir = tempdir().unwrap();
        let result = DiskTier::open(temp_dir.path(), 80);
        assert!(matches!(
            result,
            Err(crate::errors::AppError::Cache(CacheError::RuntimeUnavailable))
        ));
    }

    #[tokio::test]
    async fn test_write_remove_in_order() {
        let temp_dir = tempdir().unwrap();
        let tier = DiskTier::open(&temp_dir.path().join("images"), 80).unwrap();

        tier.queue_write("a.jpg".to_string(), image());
        tier.flush().await;
        assert!(tier.read("a.jpg").is_some());
        assert!(tier.usage_bytes() > 0);

        tier.queue_remove("a.jpg".to_string());
        tier.flush().await;
        assert!(tier.read("a.jpg").is_none());
    }

    #[tokio::test]
    async fn test_clear_recreates_directory() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("images");
        let tier = DiskTier::open(&dir, 80).unwrap();

        tier.queue_write("a.jpg".to_string(), image());
        tier.queue_clear();
        tier.queue_write("b.jpg".to_string(), image());
        tier.flush().await;

        assert!(dir.is_dir());
        assert!(tier.read("a.jpg").is_none());
        assert!(tier.read("b.jpg").is_some());
    }

    #[tokio::test]
    async fn test_queued_remove_hides_file_immediately() {
        let temp_dir = tempdir().unwrap();
        let tier = DiskTier::open(temp_dir.path(), 80).unwrap();

        tier.queue_write("a.jpg".to_string(), image());
        tier.queue_write("b.jpg".to_string(), image());
        tier.flush().await;

        tier.queue_remove("a.jpg".to_string());
        // The worker has not run yet on this single-threaded runtime
        assert!(tier.path_for("a.jpg").exists());
        assert!(tier.read("a.jpg").is_none());
        assert!(tier.read("b.jpg").is_some());

        tier.flush().await;
        assert!(!tier.path_for("a.jpg").exists());
        assert!(tier.read("a.jpg").is_none());
    }

    #[tokio::test]
    async fn test_queued_clear_hides_every_file_immediately() {
        let temp_dir = tempdir().unwrap();
        let tier = DiskTier::open(temp_dir.path(), 80).unwrap();

        tier.queue_write("a.jpg".to_string(), image());
        tier.flush().await;

        tier.queue_clear();
        assert!(tier.path_for("a.jpg").exists());
        assert!(tier.read("a.jpg").is_none());

        tier.queue_write("a.jpg".to_string(), image());
        tier.flush().await;
        assert!(tier.read("a.jpg").is_some());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_silent() {
        let temp_dir = tempdir().unwrap();
        let tier = DiskTier::open(temp_dir.path(), 80).unwrap();

        tier.queue_remove("never-written.jpg".to_string());
        tier.flush().await;
        assert_eq!(tier.usage_bytes(), 0);
    }
}
