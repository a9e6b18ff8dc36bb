use std::collections::BTreeMap;

use xxhash_rust::xxh3::xxh3_64;

/// Recursively sorts object keys so that two structurally-identical JSON
/// documents serialize to byte-identical strings regardless of original
/// key order.
#[must_use]
pub fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<String, serde_json::Value> = map
                .iter()
                .map(|(key, val)| (key.clone(), canonicalize(val)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}

/// Serializes `value` with recursively key-sorted objects, the exact input
/// the content hash is computed over.
#[must_use]
pub fn canonical_json_string(value: &serde_json::Value) -> String {
    canonicalize(value).to_string()
}

/// A fast, non-cryptographic 64-bit digest of the canonical JSON form of
/// an entity document, used for write idempotency (step 3/4 of the
/// revision pipeline). Any 64-bit hash with comparable collision
/// properties is interchangeable here; `xxh3` was chosen as the closest
/// available equivalent to the reference implementation's hash.
#[must_use]
pub fn content_hash(value: &serde_json::Value) -> u64 {
    xxh3_64(canonical_json_string(value).as_bytes())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn canonicalization_is_order_independent() {
        let a = json!({"b": 1, "a": 2, "c": {"z": 1, "y": 2}});
        let b = json!({"a": 2, "c": {"y": 2, "z": 1}, "b": 1});
        assert_eq!(canonical_json_string(&a), canonical_json_string(&b));
    }

    #[test]
    fn content_hash_matches_for_reordered_documents() {
        let a = json!({"id": "Q1", "labels": {"en": "a", "de": "b"}});
        let b = json!({"labels": {"de": "b", "en": "a"}, "id": "Q1"});
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn content_hash_differs_for_different_documents() {
        let a = json!({"id": "Q1"});
        let b = json!({"id": "Q2"});
        assert_ne!(content_hash(&a), content_hash(&b));
    }
}
