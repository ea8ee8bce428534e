//! Field-level tolerant deserializers for provider payloads.
//!
//! A value of the wrong shape becomes `None` (or an empty series) instead of
//! failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any single value; wrong type or `null` yields `None`
pub fn value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

/// An array whose elements are parsed one by one; a non-array yields `[]`
pub fn series<'de, D, T>(deserializer: D) -> Result<Vec<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "value")]
        number: Option<f64>,
        #[serde(default, deserialize_with = "series")]
        numbers: Vec<Option<f64>>,
    }

    #[test]
    fn test_well_formed_values() {
        let sample: Sample = serde_json::from_str(r#"{"number": 1.5, "numbers": [1, 2.5]}"#).unwrap();
        assert_eq!(sample.number, Some(1.5));
        assert_eq!(sample.numbers, vec![Some(1.0), Some(2.5)]);
    }

    #[test]
    fn test_wrong_types_degrade() {
        let sample: Sample =
            serde_json::from_str(r#"{"number": "warm", "numbers": [null, "x", 3]}"#).unwrap();
        assert_eq!(sample.number, None);
        assert_eq!(sample.numbers, vec![None, None, Some(3.0)]);
    }

    #[test]
    fn test_missing_and_non_array() {
        let sample: Sample = serde_json::from_str(r#"{"numbers": 7}"#).unwrap();
        assert_eq!(sample.number, None);
        assert!(sample.numbers.is_empty());
    }
}
