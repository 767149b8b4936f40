//! Value Codec Module
//!
//! The encode/decode capability injected into the cache engine.

use thiserror::Error;

use crate::value::Value;

/// A value could not be turned into bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Encode error: {0}")]
pub struct EncodeError(pub String);

/// Stored bytes could not be turned back into a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Decode error: {0}")]
pub struct DecodeError(pub String);

// == Codec ==
/// Serializes cache values to and from their stored byte form.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError>;
    fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError>;
}

// == JSON Codec ==
/// Stores values as JSON text.
///
/// Non-finite floats are rejected: JSON has no spelling for them and
/// serde_json would silently write `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        check_finite(value)?;
        serde_json::to_vec(value).map_err(|err| EncodeError(err.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        serde_json::from_slice(bytes).map_err(|err| DecodeError(err.to_string()))
    }
}

fn check_finite(value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Float(f) if !f.is_finite() => {
            Err(EncodeError(format!("{} is not representable in JSON", f)))
        }
        Value::List(items) => items.iter().try_for_each(check_finite),
        Value::Map(map) => map.values().try_for_each(check_finite),
        _ => Ok(()),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_encode_produces_json_text() {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from("bar"));
        map.insert("tags".to_string(), Value::from(vec![1, 2]));

        let bytes = JsonCodec.encode(&Value::Map(map)).unwrap();
        assert_eq!(bytes, br#"{"name":"bar","tags":[1,2]}"#.to_vec());
    }

    #[test]
    fn test_decode_stored_text() {
        let value = JsonCodec.decode(br#""bar""#).unwrap();
        assert_eq!(value, Value::from("bar"));
    }

    #[test]
    fn test_encode_rejects_nested_nan() {
        let value = Value::from(vec![Value::Float(1.0), Value::Float(f64::NAN)]);
        assert!(JsonCodec.encode(&value).is_err());
        assert!(JsonCodec.encode(&Value::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = JsonCodec.decode(b"\xff{not json").unwrap_err();
        assert!(err.to_string().starts_with("Decode error"));
    }
}
