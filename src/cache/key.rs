//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Suffix used when a request carries no filters
const NO_FILTERS: &str = "default";

/// Number of hash bytes kept in the key (rendered as twice as many hex chars)
const HASH_BYTES: usize = 8;

/// Build a deterministic cache file name from the shape of a request.
///
/// The result looks like `users-example.com-default.json` or
/// `users-example.com-3f9a0c1d2e4b5a67.json`. Filters live in a sorted map,
/// so insertion order never changes the key. Path separators in the
/// identifier are replaced so the key is always a single file name.
pub fn build_key(
    resource_type: &str,
    identifier: &str,
    filters: &BTreeMap<String, String>,
) -> String {
    let suffix = if filters.is_empty() {
        NO_FILTERS.to_string()
    } else {
        let mut hasher = Sha256::new();
        for (k, v) in filters {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }
        hasher.finalize()[..HASH_BYTES]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    };

    format!(
        "{}-{}-{}.json",
        resource_type,
        sanitize_segment(identifier),
        suffix
    )
}

/// Convenience for building a filter map from string pairs
pub fn filters<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}
