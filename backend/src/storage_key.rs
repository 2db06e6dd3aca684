//! Storage key generation
//!
//! Keys have the form `{millis}-{token}.{extension}`: a millisecond timestamp that
//! never decreases within the process, a short random token separating uploads of
//! the same millisecond, and the extension of the uploaded file name as written.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rand::Rng;

/// Length of the random token
pub const TOKEN_LEN: usize = 6;

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Longest extension carried over into a key
pub const MAX_EXTENSION_LEN: usize = 16;

/// S3 limits keys to 1024 bytes
pub const MAX_KEY_LEN: usize = 1024;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Generates a new storage key for a file named `original_name`
///
/// The name is only used for its extension; file contents are never inspected.
#[must_use]
pub fn generate(original_name: &str) -> String {
    let millis = monotonic_millis();
    let token = random_token();

    match extension(original_name) {
        Some(extension) => format!("{millis}-{token}.{extension}"),
        None => format!("{millis}-{token}"),
    }
}

/// Extension of `original_name`, if it is safe to embed in a key
///
/// The text after the last `.` is accepted, case preserved, when it is short and
/// ASCII alphanumeric.
#[must_use]
pub fn extension(original_name: &str) -> Option<&str> {
    let (_, extension) = original_name.rsplit_once('.')?;

    let is_safe = !extension.is_empty()
        && extension.len() <= MAX_EXTENSION_LEN
        && extension.bytes().all(|b| b.is_ascii_alphanumeric());

    is_safe.then_some(extension)
}

/// Whether `key` can be sent to the object store as a key
#[must_use]
pub fn is_valid(key: &str) -> bool {
    !key.is_empty() && key.len() <= MAX_KEY_LEN && !key.chars().any(char::is_control)
}

fn monotonic_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_MILLIS.fetch_max(now, Ordering::Relaxed);
    previous.max(now)
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn split_key(key: &str) -> (i64, &str, Option<&str>) {
        let (millis, rest) = key.split_once('-').unwrap();
        let (token, extension) = match rest.split_once('.') {
            Some((token, extension)) => (token, Some(extension)),
            None => (rest, None),
        };
        (millis.parse().unwrap(), token, extension)
    }

    #[test]
    fn test_key_shape() {
        let key = generate("cat.png");
        let (millis, token, extension) = split_key(&key);

        assert!(millis > 0);
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        assert_eq!(extension, Some("png"));
    }

    #[test]
    fn test_extension_rules() {
        assert_eq!(extension("photo.JPG"), Some("JPG"));
        assert_eq!(extension("archive.tar.gz"), Some("gz"));
        assert_eq!(extension("README"), None);
        assert_eq!(extension("trailing."), None);
        assert_eq!(extension("weird.p/ng"), None);
        assert_eq!(extension("dots.a b"), None);
        assert_eq!(extension("long.abcdefghijklmnopq"), None);
        assert_eq!(extension(".gitignore"), Some("gitignore"));
    }

    #[test]
    fn test_key_keeps_extension_case() {
        let key = generate("Holiday.JPEG");
        assert_eq!(split_key(&key).2, Some("JPEG"));
    }

    #[test]
    fn test_name_without_extension_has_no_dot() {
        let key = generate("README");
        assert!(!key.contains('.'));
        assert_eq!(split_key(&key).2, None);
    }

    #[test]
    fn test_keys_are_distinct_and_time_ordered() {
        let keys: Vec<String> = (0..2_000).map(|_| generate("a.png")).collect();

        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());

        let millis: Vec<i64> = keys.iter().map(|key| split_key(key).0).collect();
        assert!(millis.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_key_validation() {
        assert!(is_valid("1700000000000-abc123.png"));
        assert!(is_valid("folder/nested.png"));
        assert!(!is_valid(""));
        assert!(!is_valid("bad\nkey"));
        assert!(!is_valid(&"a".repeat(MAX_KEY_LEN + 1)));
    }
}
