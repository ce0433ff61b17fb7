use image::{DynamicImage, Rgb, RgbImage};
use love2love::cache::{cache_key, CacheStats, DecodedImage, ImageCache};
use love2love::config::CacheConfig;
use std::fs;
use tempfile::{tempdir, TempDir};

const AVATAR: &str = "https://firebasestorage.googleapis.com/v0/b/love2love/o/users%2F42%2Favatar.jpg?alt=media&token=1";
const COVER: &str = "https://firebasestorage.googleapis.com/v0/b/love2love/o/journal%2F7%2Fcover.jpg?alt=media&token=2";
const PHOTO: &str = "https://firebasestorage.googleapis.com/v0/b/love2love/o/journal%2F8%2Fphoto.jpg?alt=media&token=3";

/// 10x10 RGB image, 300 decoded bytes.
fn swatch(shade: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([shade, shade, shade])))
}

fn open_cache(budget_bytes: usize) -> (TempDir, ImageCache) {
    let temp_dir = tempdir().unwrap();
    let config =
        CacheConfig::new(temp_dir.path().join("images")).with_memory_budget(budget_bytes);
    let cache = ImageCache::new(&config).unwrap();
    (temp_dir, cache)
}

#[test]
fn test_cache_key_is_deterministic() {
    assert_eq!(cache_key(AVATAR), cache_key(AVATAR));
    assert_ne!(cache_key(AVATAR), cache_key(COVER));
    assert!(cache_key(AVATAR).as_str().len() <= 200);
}

#[tokio::test]
async fn test_put_then_get_from_memory() {
    let (_temp_dir, cache) = open_cache(1024 * 1024);

    cache.put(swatch(10), AVATAR);
    let image = cache.get(AVATAR).unwrap();
    assert_eq!((image.width(), image.height()), (10, 10));

    assert!(cache.get(COVER).is_none());
    assert_eq!(
        cache.stats(),
        CacheStats {
            memory_hits: 1,
            disk_hits: 0,
            misses: 1
        }
    );
}

#[tokio::test]
async fn test_disk_hit_is_promoted_to_memory() {
    let temp_dir = tempdir().unwrap();
    let config = CacheConfig::new(temp_dir.path().join("images"));

    {
        let writer = ImageCache::new(&config).unwrap();
        writer.put(swatch(200), AVATAR);
        writer.flush().await;
    }

    let cache = ImageCache::new(&config).unwrap();
    assert!(!cache.is_in_memory(AVATAR));

    let image = cache.get(AVATAR).unwrap();
    assert_eq!(image.width(), 10);
    assert!(cache.is_in_memory(AVATAR));

    // Promoted entry survives losing the file
    fs::remove_file(config.cache_dir.join(cache_key(AVATAR).file_name())).unwrap();
    assert!(cache.get(AVATAR).is_some());

    let stats = cache.stats();
    assert_eq!(stats.disk_hits, 1);
    assert_eq!(stats.memory_hits, 1);
}

#[tokio::test]
async fn test_memory_pressure_evicts_least_recently_used() {
    // Room for two 300-byte images
    let (_temp_dir, cache) = open_cache(700);

    cache.put(swatch(1), AVATAR);
    cache.put(swatch(2), COVER);
    assert!(cache.get(AVATAR).is_some());

    cache.put(swatch(3), PHOTO);
    assert!(cache.memory_usage_bytes() <= 700);
    assert!(cache.is_in_memory(AVATAR));
    assert!(cache.is_in_memory(PHOTO));
    assert!(!cache.is_in_memory(COVER));

    // Evicted from memory but still served from disk
    cache.flush().await;
    assert!(cache.get(COVER).is_some());
    assert!(cache.memory_usage_bytes() <= 700);
}

#[tokio::test]
async fn test_image_larger_than_budget_still_reaches_disk() {
    let (_temp_dir, cache) = open_cache(100);

    cache.put(swatch(5), AVATAR);
    assert!(!cache.is_in_memory(AVATAR));
    assert_eq!(cache.memory_usage_bytes(), 0);

    cache.flush().await;
    assert!(cache.size_report().disk_usage_bytes > 0);
}

#[tokio::test]
async fn test_overwrite_replaces_entry() {
    let (_temp_dir, cache) = open_cache(1024 * 1024);

    cache.put(swatch(0), AVATAR);
    cache.put(swatch(255), AVATAR);
    assert_eq!(cache.memory_usage_bytes(), 300);

    let image = cache.get(AVATAR).unwrap();
    assert_eq!(image.as_dynamic().to_rgb8().get_pixel(0, 0), &Rgb([255, 255, 255]));

    cache.flush().await;
    let on_disk = fs::read(cache.cache_dir().join(cache_key(AVATAR).file_name())).unwrap();
    let decoded = DecodedImage::decode_jpeg(&on_disk).unwrap();
    assert!(decoded.as_dynamic().to_rgb8().get_pixel(0, 0)[0] > 200);
}

#[tokio::test]
async fn test_evict_removes_both_tiers() {
    let (_temp_dir, cache) = open_cache(1024 * 1024);

    cache.put(swatch(9), AVATAR);
    cache.flush().await;

    cache.evict(AVATAR);
    cache.flush().await;

    assert!(cache.get(AVATAR).is_none());
    assert_eq!(cache.size_report().disk_usage_bytes, 0);
}

#[tokio::test]
async fn test_get_after_evict_does_not_resurrect_entry() {
    let (_temp_dir, cache) = open_cache(1024 * 1024);

    cache.put(swatch(9), AVATAR);
    cache.put(swatch(10), COVER);
    cache.flush().await;

    cache.evict(AVATAR);
    assert!(cache.get(AVATAR).is_none());
    assert!(!cache.is_in_memory(AVATAR));
    assert!(cache.get(COVER).is_some());

    cache.flush().await;
    assert!(cache.get(AVATAR).is_none());
    assert!(!cache.is_in_memory(AVATAR));
}

#[tokio::test]
async fn test_get_after_clear_does_not_resurrect_entries() {
    let (_temp_dir, cache) = open_cache(1024 * 1024);

    cache.put(swatch(1), AVATAR);
    cache.flush().await;

    cache.clear();
    assert!(cache.get(AVATAR).is_none());

    cache.flush().await;
    assert!(cache.get(AVATAR).is_none());
    assert!(!cache.is_in_memory(AVATAR));
    assert_eq!(cache.memory_usage_bytes(), 0);
}

#[tokio::test]
async fn test_clear_is_destructive() {
    let (_temp_dir, cache) = open_cache(1024 * 1024);

    cache.put(swatch(1), AVATAR);
    cache.put(swatch(2), COVER);
    cache.cache_image_for_widget(swatch(3), "partner_photo.jpg");
    cache.flush().await;
    assert!(cache.size_report().disk_usage_bytes > 0);

    cache.clear();
    assert_eq!(cache.memory_usage_bytes(), 0);
    assert!(cache.get(AVATAR).is_none());

    cache.flush().await;
    assert!(cache.cache_dir().is_dir());
    assert_eq!(cache.size_report().disk_usage_bytes, 0);
    assert!(cache.get(COVER).is_none());
    assert!(cache.get_cached_widget_image("partner_photo.jpg").is_none());
}

#[tokio::test]
async fn test_widget_namespace_uses_literal_file_name() {
    let (_temp_dir, cache) = open_cache(1024 * 1024);

    cache.cache_image_for_widget(swatch(128), "partner_photo.jpg");
    cache.flush().await;

    assert!(cache.cache_dir().join("partner_photo.jpg").is_file());
    let image = cache.get_cached_widget_image("partner_photo.jpg").unwrap();
    assert_eq!((image.width(), image.height()), (10, 10));

    // Widget images never enter the memory tier
    assert_eq!(cache.memory_usage_bytes(), 0);
    assert!(cache.get_cached_widget_image("missing.jpg").is_none());
}

#[tokio::test]
async fn test_widget_names_cannot_escape_cache_dir() {
    let temp_dir = tempdir().unwrap();
    let cache = ImageCache::new(&CacheConfig::new(temp_dir.path().join("images"))).unwrap();

    cache.cache_image_for_widget(swatch(1), "../escaped.jpg");
    cache.flush().await;

    assert!(!temp_dir.path().join("escaped.jpg").exists());
    assert!(cache.get_cached_widget_image("../escaped.jpg").is_none());
}

#[tokio::test]
async fn test_size_report() {
    let (_temp_dir, cache) = open_cache(100 * 1024 * 1024);

    let empty = cache.size_report();
    assert_eq!(empty.memory_budget, "100.0 MB");
    assert_eq!(empty.disk_usage_bytes, 0);

    cache.put(swatch(42), AVATAR);
    cache.flush().await;

    let report = cache.size_report();
    assert!(report.disk_usage_bytes > 0);
    assert!(report
        .to_string()
        .starts_with("Memory cache: 100.0 MB (budget), Disk cache: "));
}

#[tokio::test]
async fn test_corrupt_disk_entry_is_a_miss() {
    let (_temp_dir, cache) = open_cache(1024 * 1024);

    fs::write(
        cache.cache_dir().join(cache_key(AVATAR).file_name()),
        b"not a jpeg",
    )
    .unwrap();

    assert!(cache.get(AVATAR).is_none());
    assert_eq!(cache.stats().misses, 1);
}
