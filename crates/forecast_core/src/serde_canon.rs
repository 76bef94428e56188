//! Canonical JSON for hashed artifacts
//!
//! Object keys are emitted in byte order at every nesting level and the
//! output is compact, so equal values always hash to the same digest.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanonicalError {
    #[error("cannot encode value as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Compact JSON with recursively sorted object keys
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let mut tree = serde_json::to_value(value)?;
    sort_keys(&mut tree);
    Ok(serde_json::to_string(&tree)?)
}

fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (_, child) in entries.iter_mut() {
                sort_keys(child);
            }
            *map = entries.into_iter().collect::<Map<String, Value>>();
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

/// Hex blake3 digest of raw bytes
pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

/// Hex blake3 digest of the canonical JSON form of `value`
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    Ok(hash_bytes_hex(to_canonical_json(value)?.as_bytes()))
}
