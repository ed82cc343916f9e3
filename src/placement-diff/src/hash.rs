use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::DiffError;

/// sha256 over the compact json encoding, lowercase hex
pub fn object_hash<T>(object: &T) -> Result<String, DiffError>
where
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_vec(object)?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    let hash = format!("{:x}", hasher.finalize());
    trace!(len = encoded.len(), %hash, "object hash");
    Ok(hash)
}
