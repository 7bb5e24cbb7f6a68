//! Wire codec for associative containers.
//!
//! Saves written by different releases encode maps in one of three ways:
//!
//! | Encoding | Example |
//! |----------|---------|
//! | Ordered-pair sequence | `[["health", 1], ["defence", 2]]` |
//! | Keyed object | `{"health": 1, "defence": 2}` |
//! | Tagged native map | `{"dataType": "Map", "value": [["health", 1]]}` |
//!
//! [`decode_map`] accepts all three and always yields a [`BTreeMap`].
//! Writing always produces the ordered-pair sequence, so a blob read in
//! any encoding is re-saved in exactly one.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Tag value identifying a native-map envelope.
const NATIVE_MAP_TAG: &str = "Map";

/// Errors produced while decoding a persisted container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    /// The value is not any of the known container encodings.
    #[error("unrecognised container encoding: found {found}")]
    Unrecognised {
        /// JSON kind that was found instead.
        found: &'static str,
    },

    /// An individual entry could not be decoded.
    #[error("bad container entry at position {index}: {reason}")]
    BadEntry {
        /// Zero-based position of the entry.
        index: usize,
        /// Description of the failure.
        reason: String,
    },
}

/// Name of the JSON kind of a value, for diagnostics.
const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Split a container into raw key/value entries without interpreting them.
///
/// Keys from a keyed object are returned as JSON strings; keys from pair
/// sequences keep whatever JSON type they were written with. `null` is an
/// empty container.
pub fn decode_entries(value: &Value) -> Result<Vec<(Value, Value)>, ContainerError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Array(pair) => match pair.as_slice() {
                    [k, v] => Ok((k.clone(), v.clone())),
                    _ => Err(ContainerError::BadEntry {
                        index,
                        reason: format!("expected a pair, got {} elements", pair.len()),
                    }),
                },
                other => Err(ContainerError::BadEntry {
                    index,
                    reason: format!("expected a pair, got {}", kind_of(other)),
                }),
            })
            .collect(),
        Value::Object(fields) => {
            if fields.get("dataType").and_then(Value::as_str) == Some(NATIVE_MAP_TAG) {
                return fields
                    .get("value")
                    .map_or_else(|| Ok(Vec::new()), decode_entries);
            }
            Ok(fields
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                .collect())
        }
        other => Err(ContainerError::Unrecognised {
            found: kind_of(other),
        }),
    }
}

/// Interpret a raw key, retrying object-style string keys as numbers.
fn decode_key<K: DeserializeOwned>(key: Value) -> Result<K, String> {
    match serde_json::from_value::<K>(key.clone()) {
        Ok(k) => Ok(k),
        Err(first) => {
            let numeric = key
                .as_str()
                .and_then(|s| s.parse::<serde_json::Number>().ok());
            match numeric {
                Some(n) => serde_json::from_value::<K>(Value::Number(n)).map_err(|e| e.to_string()),
                None => Err(first.to_string()),
            }
        }
    }
}

/// Decode a container in any supported encoding into a [`BTreeMap`].
///
/// Later duplicates of a key overwrite earlier ones.
pub fn decode_map<K, V>(value: &Value) -> Result<BTreeMap<K, V>, ContainerError>
where
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    let mut map = BTreeMap::new();
    for (index, (k, v)) in decode_entries(value)?.into_iter().enumerate() {
        let key = decode_key::<K>(k).map_err(|reason| ContainerError::BadEntry { index, reason })?;
        let val = serde_json::from_value::<V>(v).map_err(|e| ContainerError::BadEntry {
            index,
            reason: e.to_string(),
        })?;
        map.insert(key, val);
    }
    Ok(map)
}

/// Decode a container, falling back to an empty map when it is unparseable.
pub fn decode_map_lenient<K, V>(value: &Value) -> BTreeMap<K, V>
where
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    decode_map(value).unwrap_or_default()
}

/// Encode raw entries in the canonical ordered-pair form.
pub fn encode_entries(entries: Vec<(Value, Value)>) -> Value {
    Value::Array(
        entries
            .into_iter()
            .map(|(k, v)| Value::Array(vec![k, v]))
            .collect(),
    )
}

/// Serde adapter that writes a [`BTreeMap`] as an ordered-pair sequence
/// and reads any supported encoding.
///
/// Use with `#[serde(with = "chancellor_types::codec::pair_seq")]`.
pub mod pair_seq {
    use std::collections::BTreeMap;

    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    /// Serialize as `[[k, v], ...]` in key order.
    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    /// Deserialize from any supported encoding; unparseable input is empty.
    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: DeserializeOwned + Ord,
        V: DeserializeOwned,
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(super::decode_map_lenient(&value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::enums::Department;

    #[test]
    fn all_three_encodings_decode_to_the_same_map() {
        let pairs = json!([["health", 1], ["defence", 2]]);
        let object = json!({"health": 1, "defence": 2});
        let native = json!({"dataType": "Map", "value": [["defence", 2], ["health", 1]]});

        let a: BTreeMap<Department, u32> = decode_map(&pairs).unwrap();
        let b: BTreeMap<Department, u32> = decode_map(&object).unwrap();
        let c: BTreeMap<Department, u32> = decode_map(&native).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.get(&Department::Defence), Some(&2));
    }

    #[test]
    fn object_keys_are_retried_as_numbers() {
        let object = json!({"7": "seven", "12": "twelve"});
        let map: BTreeMap<u32, String> = decode_map(&object).unwrap();
        assert_eq!(map.get(&7).map(String::as_str), Some("seven"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn null_is_empty_and_scalars_are_rejected() {
        let empty: BTreeMap<u32, u32> = decode_map(&Value::Null).unwrap();
        assert!(empty.is_empty());
        let err = decode_map::<u32, u32>(&json!(42)).unwrap_err();
        assert_eq!(err, ContainerError::Unrecognised { found: "number" });
    }

    #[test]
    fn malformed_entry_reports_position() {
        let bad = json!([[1, 2], [3]]);
        let err = decode_map::<u32, u32>(&bad).unwrap_err();
        assert!(matches!(err, ContainerError::BadEntry { index: 1, .. }));
    }

    #[test]
    fn lenient_decode_falls_back_to_empty() {
        let map: BTreeMap<Department, u32> = decode_map_lenient(&json!("garbage"));
        assert!(map.is_empty());
        let map: BTreeMap<Department, u32> = decode_map_lenient(&json!({"not_a_dept": 1}));
        assert!(map.is_empty());
    }

    #[test]
    fn pair_seq_writes_canonical_form() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(with = "pair_seq")]
            inner: BTreeMap<Department, u32>,
        }
        let holder: Holder = serde_json::from_value(json!({"inner": {"health": 3}})).unwrap();
        let out = serde_json::to_value(&holder).unwrap();
        assert_eq!(out, json!({"inner": [["health", 3]]}));
    }
}
