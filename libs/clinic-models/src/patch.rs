//! Partial-update merging.
//!
//! Update bodies carry only the fields being changed. They are merged over the stored
//! record's insertable fields and the result is re-read as the full type, so serde's
//! required-field checks apply to the merged value, not to the patch.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Keys owned by the store that a patch may never overwrite.
const PROTECTED_KEYS: &[&str] = &["id", "createdAt"];

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("update body must be a JSON object")]
    NotAnObject,
    #[error("{0}")]
    Invalid(#[from] serde_json::Error),
}

/// Shallow-merge `patch` over `current`.
///
/// Explicit `null` clears a field; absent fields keep their stored value.
pub fn apply_patch<T>(current: &T, patch: &JsonValue) -> Result<T, PatchError>
where
    T: Serialize + DeserializeOwned,
{
    let patch = patch.as_object().ok_or(PatchError::NotAnObject)?;

    let mut merged: Map<String, JsonValue> = match serde_json::to_value(current)? {
        JsonValue::Object(map) => map,
        _ => return Err(PatchError::NotAnObject),
    };

    for (key, value) in patch {
        if PROTECTED_KEYS.contains(&key.as_str()) {
            continue;
        }
        merged.insert(key.clone(), value.clone());
    }

    Ok(serde_json::from_value(JsonValue::Object(merged))?)
}
