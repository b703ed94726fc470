//! Content fingerprints used as store etags: lowercase blake3 hex.

use serde_json::Value;

use crate::error::Result;

pub fn etag_for_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Etag of a JSON document via its compact serialization.
pub fn etag_for_json(doc: &Value) -> Result<String> {
    Ok(etag_for_bytes(&serde_json::to_vec(doc)?))
}
