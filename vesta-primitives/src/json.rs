//! Conversion between JSON documents and transaction metadata trees

use serde_json::Value as JsonValue;
use std::fmt;

use crate::{Bytes, Int, KeyValuePairs, Metadatum};

/// Text and byte payloads inside a metadatum are capped at 64 bytes
const MAX_CHUNK: usize = 64;

#[derive(Debug, PartialEq, Eq)]
pub enum JsonConversionError {
    UnsupportedNull,
    UnsupportedBool,
    NonIntegerNumber,
    OversizedString(usize),
    OversizedBytes(usize),
}

impl fmt::Display for JsonConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedNull => write!(f, "json null has no metadatum representation"),
            Self::UnsupportedBool => write!(f, "json booleans have no metadatum representation"),
            Self::NonIntegerNumber => write!(f, "metadatum numbers must be integers"),
            Self::OversizedString(n) => write!(f, "metadatum text of {n} bytes exceeds 64"),
            Self::OversizedBytes(n) => write!(f, "metadatum bytes of {n} bytes exceed 64"),
        }
    }
}

impl std::error::Error for JsonConversionError {}

/// Map a JSON document onto a metadatum tree.
///
/// Numbers must be integers. Strings prefixed with `0x` that parse as hex
/// become byte strings, anything else stays text. Object keys are text.
pub fn metadatum_from_json(json: &JsonValue) -> Result<Metadatum, JsonConversionError> {
    match json {
        JsonValue::Null => Err(JsonConversionError::UnsupportedNull),
        JsonValue::Bool(_) => Err(JsonConversionError::UnsupportedBool),
        JsonValue::Number(n) => {
            if let Some(x) = n.as_i64() {
                Ok(Metadatum::Int(Int::from(x)))
            } else if let Some(x) = n.as_u64() {
                let int = Int::try_from(x as i128)
                    .map_err(|_| JsonConversionError::NonIntegerNumber)?;
                Ok(Metadatum::Int(int))
            } else {
                Err(JsonConversionError::NonIntegerNumber)
            }
        }
        JsonValue::String(s) => string_to_metadatum(s),
        JsonValue::Array(xs) => {
            let items: Result<Vec<_>, _> = xs.iter().map(metadatum_from_json).collect();
            Ok(Metadatum::Array(items?))
        }
        JsonValue::Object(entries) => {
            let mut pairs = Vec::with_capacity(entries.len());

            for (k, v) in entries {
                pairs.push((string_to_metadatum(k)?, metadatum_from_json(v)?));
            }

            Ok(Metadatum::Map(KeyValuePairs::from(pairs)))
        }
    }
}

fn string_to_metadatum(s: &str) -> Result<Metadatum, JsonConversionError> {
    if let Some(hex_part) = s.strip_prefix("0x") {
        if let Ok(bytes) = hex::decode(hex_part) {
            if bytes.len() > MAX_CHUNK {
                return Err(JsonConversionError::OversizedBytes(bytes.len()));
            }

            return Ok(Metadatum::Bytes(Bytes::from(bytes)));
        }
    }

    if s.len() > MAX_CHUNK {
        return Err(JsonConversionError::OversizedString(s.len()));
    }

    Ok(Metadatum::Text(s.to_owned()))
}

/// Render a metadatum tree back into JSON, the inverse of
/// [metadatum_from_json] for trees that came from it.
pub fn metadatum_to_json(metadatum: &Metadatum) -> JsonValue {
    match metadatum {
        Metadatum::Int(x) => {
            let value = i128::from(*x);
            match i64::try_from(value) {
                Ok(x) => JsonValue::from(x),
                Err(_) => JsonValue::from(value.to_string()),
            }
        }
        Metadatum::Bytes(xs) => JsonValue::from(format!("0x{xs}")),
        Metadatum::Text(s) => JsonValue::from(s.clone()),
        Metadatum::Array(xs) => JsonValue::Array(xs.iter().map(metadatum_to_json).collect()),
        Metadatum::Map(pairs) => {
            let entries = pairs.iter().map(|(k, v)| {
                let key = match k {
                    Metadatum::Text(s) => s.clone(),
                    Metadatum::Bytes(xs) => format!("0x{xs}"),
                    Metadatum::Int(x) => i128::from(*x).to_string(),
                    _ => String::new(),
                };

                (key, metadatum_to_json(v))
            });

            JsonValue::Object(entries.collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_convert() {
        let m = metadatum_from_json(&json!(42)).unwrap();
        assert_eq!(m, Metadatum::Int(Int::from(42)));

        let m = metadatum_from_json(&json!("hello")).unwrap();
        assert_eq!(m, Metadatum::Text("hello".into()));

        let m = metadatum_from_json(&json!("0xdeadbeef")).unwrap();
        assert_eq!(m, Metadatum::Bytes(Bytes::from(vec![0xde, 0xad, 0xbe, 0xef])));
    }

    #[test]
    fn nested_objects_convert() {
        let doc = json!({
            "name": "token",
            "tags": [1, 2, 3],
        });

        let m = metadatum_from_json(&doc).unwrap();

        match m {
            Metadatum::Map(pairs) => assert_eq!(pairs.len(), 2),
            _ => panic!("expected a map"),
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            metadatum_from_json(&json!(null)),
            Err(JsonConversionError::UnsupportedNull)
        );

        assert_eq!(
            metadatum_from_json(&json!(true)),
            Err(JsonConversionError::UnsupportedBool)
        );

        assert_eq!(
            metadatum_from_json(&json!(1.5)),
            Err(JsonConversionError::NonIntegerNumber)
        );

        let long = "x".repeat(65);
        assert!(matches!(
            metadatum_from_json(&json!(long)),
            Err(JsonConversionError::OversizedString(65))
        ));
    }

    #[test]
    fn roundtrip_through_json() {
        let doc = json!({
            "msg": ["hello", "world"],
            "num": 7,
        });

        let m = metadatum_from_json(&doc).unwrap();
        assert_eq!(metadatum_to_json(&m), doc);
    }
}
