//! Cache key derivation.
//!
//! Keys are filesystem-safe and deterministic across processes: the locator's path
//! with `/` mapped to `_`, an underscore plus a BLAKE3 prefix of the query when there is
//! one, every character outside `[A-Za-z0-9._-]` replaced by `_`, and overlong keys
//! truncated with a hash suffix. Locators that do not parse as absolute URLs are hashed
//! whole.

use crate::constants::{CACHE_FILE_EXTENSION, KEY_HASH_SUFFIX_LEN, MAX_CACHE_KEY_LEN};
use std::fmt;
use url::Url;

/// A derived, filesystem-safe cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the disk tier file for this key (`<key>.jpg`).
    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, CACHE_FILE_EXTENSION)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn short_hash(input: &str) -> String {
    let hex = blake3::hash(input.as_bytes()).to_hex();
    hex.as_str()[..KEY_HASH_SUFFIX_LEN].to_string()
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Derives the cache key for `locator`.
///
/// # Examples
///
/// ```
/// use love2love::cache::cache_key;
///
/// let key = cache_key("https://cdn.example.com/users/42/avatar.jpg");
/// assert_eq!(key.as_str(), "_users_42_avatar.jpg");
/// assert_eq!(key, cache_key("https://cdn.example.com/users/42/avatar.jpg"));
///
/// let with_query = cache_key("https://cdn.example.com/users/42/avatar.jpg?size=200");
/// assert!(with_query.as_str().starts_with("_users_42_avatar.jpg_"));
/// ```
pub fn cache_key(locator: &str) -> CacheKey {
    let Ok(url) = Url::parse(locator) else {
        return CacheKey(blake3::hash(locator.as_bytes()).to_hex().to_string());
    };

    let mut raw = url.path().replace('/', "_");
    if let Some(query) = url.query() {
        raw.push('_');
        raw.push_str(&short_hash(query));
    }

    let mut key = sanitize(&raw);

    if key.len() > MAX_CACHE_KEY_LEN {
        let suffix = short_hash(&key);
        // ASCII only after sanitize, so byte truncation is on a char boundary.
        key.truncate(MAX_CACHE_KEY_LEN - KEY_HASH_SUFFIX_LEN - 1);
        key.push('_');
        key.push_str(&suffix);
    }

    CacheKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_becomes_key() {
        let key = cache_key("https://firebasestorage.googleapis.com/v0/b/app/o/photo.jpg");
        assert_eq!(key.as_str(), "_v0_b_app_o_photo.jpg");
        assert_eq!(key.file_name(), "_v0_b_app_o_photo.jpg.jpg");
    }

    #[test]
    fn test_unsafe_characters_replaced() {
        let key = cache_key("https://example.com/a%2Fb/c d~e@f.png");
        assert!(key
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
    }

    #[test]
    fn test_query_distinguishes_keys() {
        let a = cache_key("https://example.com/img.jpg?alt=media&token=abc");
        let b = cache_key("https://example.com/img.jpg?alt=media&token=abd");
        let plain = cache_key("https://example.com/img.jpg");

        assert_ne!(a, b);
        assert_ne!(a, plain);
        assert_eq!(a.as_str().len(), plain.as_str().len() + 1 + KEY_HASH_SUFFIX_LEN);
    }

    #[test]
    fn test_path_distinguishes_keys() {
        assert_ne!(
            cache_key("https://example.com/users/1.jpg"),
            cache_key("https://example.com/users/2.jpg")
        );
    }

    #[test]
    fn test_unparsable_locator_is_hashed() {
        let key = cache_key("not a url at all");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, cache_key("not a url at all"));
        assert_ne!(key, cache_key("not a url at all!"));
    }

    #[test]
    fn test_overlong_key_is_capped_and_unique() {
        let long_a = format!("https://example.com/{}/a.jpg", "x".repeat(400));
        let long_b = format!("https://example.com/{}/b.jpg", "x".repeat(400));

        let a = cache_key(&long_a);
        let b = cache_key(&long_b);

        assert_eq!(a.as_str().len(), MAX_CACHE_KEY_LEN);
        assert_eq!(b.as_str().len(), MAX_CACHE_KEY_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_at_limit_is_untouched() {
        let path = "y".repeat(MAX_CACHE_KEY_LEN - 1);
        let key = cache_key(&format!("https://example.com/{}", path));
        assert_eq!(key.as_str(), format!("_{}", path));
    }
}
