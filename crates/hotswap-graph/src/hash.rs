//! Content fingerprints for change detection.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

/// Length of every fingerprint returned by [`content_hash`].
pub const CONTENT_HASH_LEN: usize = 20;

/// Hash module source using SHA-256.
///
/// Returns the first [`CONTENT_HASH_LEN`] characters of the URL-safe base64
/// digest. Equal fingerprints mean the source is unchanged with high
/// confidence; different fingerprints always mean it changed.
pub fn content_hash(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(CONTENT_HASH_LEN);
    encoded
}
