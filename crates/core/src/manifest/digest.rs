//! Manifest version identity.

use sha2::{Digest, Sha256};

/// Compute a stable identity for a set of `(path, fingerprint)` entries.
///
/// Entries must be supplied in sorted path order.
pub fn manifest_digest<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut hasher = Sha256::new();
    for (path, fingerprint) in entries {
        hasher.update(path.as_bytes());
        hasher.update(b"\t");
        hasher.update(fingerprint.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
