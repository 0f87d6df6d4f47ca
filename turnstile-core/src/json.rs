//! # JSON Helpers
//!
//! High-performance JSON parsing using simd-json with serde_json for
//! serialization (simd-json is primarily for parsing).
//!
//! ## Design Principles
//!
//! - **S**: Only handles JSON serialization/deserialization
//! - **O**: Extensible via serde traits
//! - **D**: Callers depend on serde abstractions, not concrete parsers

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parse JSON text to a typed value using simd-json
///
/// # Errors
///
/// Returns [`Error::Decode`] if parsing fails.
pub fn parse_json<T: DeserializeOwned>(json_str: &str) -> Result<T> {
    let mut bytes = json_str.as_bytes().to_vec();
    simd_json::from_slice(&mut bytes).map_err(|e| Error::Decode {
        reason: e.to_string(),
    })
}

/// Parse JSON bytes to a typed value using simd-json
///
/// simd-json parses in place, so the input buffer is mutated.
///
/// # Errors
///
/// Returns [`Error::Decode`] if parsing fails.
pub fn parse_json_bytes<T: DeserializeOwned>(bytes: &mut [u8]) -> Result<T> {
    simd_json::from_slice(bytes).map_err(|e| Error::Decode {
        reason: e.to_string(),
    })
}

/// Serialize a value to a compact JSON string
///
/// # Errors
///
/// Returns [`Error::Encode`] if serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Encode {
        reason: e.to_string(),
    })
}

/// Serialize a value to a pretty-printed (2-space indented) JSON string
///
/// # Errors
///
/// Returns [`Error::Encode`] if serialization fails.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Encode {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        age: i32,
    }

    #[test]
    fn test_parse_json_object() {
        let json = r#"{"name": "John", "age": 30}"#;
        let data: TestData = parse_json(json).unwrap();
        assert_eq!(data.name, "John");
        assert_eq!(data.age, 30);
    }

    #[test]
    fn test_parse_json_bytes() {
        let mut bytes = r#"{"name": "Jane", "age": 25}"#.as_bytes().to_vec();
        let data: TestData = parse_json_bytes(&mut bytes).unwrap();
        assert_eq!(data.name, "Jane");
    }

    #[test]
    fn test_parse_json_dynamic() {
        let value: Value = parse_json(r#"{"k": [1, 2, 3]}"#).unwrap();
        assert_eq!(value, json!({"k": [1, 2, 3]}));
    }

    #[test]
    fn test_to_json_compact_and_pretty() {
        let data = TestData {
            name: "Bob".to_string(),
            age: 40,
        };
        let compact = to_json(&data).unwrap();
        assert!(!compact.contains('\n'));

        let pretty = to_json_pretty(&data).unwrap();
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("Bob"));
    }

    #[test]
    fn test_invalid_json() {
        let result: Result<TestData> = parse_json("not valid json");
        assert!(matches!(result, Err(Error::Decode { .. })));
    }
}
