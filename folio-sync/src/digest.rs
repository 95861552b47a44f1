//! Content digest behind the unchanged-write gate.

use folio_core::Project;
use sha2::{Digest, Sha256};

/// SHA-256 (hex) of the serialized project list, as it would be stored.
pub fn content_digest(projects: &[Project]) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(projects)?;
    let mut h = Sha256::new();
    h.update(&bytes);
    Ok(hex::encode(h.finalize()))
}
