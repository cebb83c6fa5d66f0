//! Conversion between caller values, the neutral JSON form and typed payloads.
//!
//! Translation is a round trip through [`serde_json::Value`]: a caller's
//! object, a map and a typed instance with the same shape all arrive at the
//! handler as the same typed value.

use courier_core::TranslateError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::type_name;

/// Encodes `value` into its neutral form.
pub fn to_neutral<S: Serialize + ?Sized>(value: &S) -> Result<Value, TranslateError> {
    serde_json::to_value(value).map_err(|source| TranslateError::Encode {
        source_type: type_name::<S>(),
        source,
    })
}

/// Decodes a neutral value into `T`.
pub fn from_neutral<T: DeserializeOwned>(value: Value) -> Result<T, TranslateError> {
    serde_json::from_value(value).map_err(|source| TranslateError::PayloadShape {
        target: type_name::<T>(),
        source,
    })
}

/// Converts any serializable value into `T` by shape.
pub fn to_typed<S: Serialize + ?Sized, T: DeserializeOwned>(value: &S) -> Result<T, TranslateError> {
    from_neutral(to_neutral(value)?)
}

/// Converts a raw handler result into the caller's requested type.
///
/// A null result (no value, or a unit response) becomes `None`.
pub fn to_requested<T: DeserializeOwned>(result: Value) -> Result<Option<T>, TranslateError> {
    if result.is_null() {
        return Ok(None);
    }
    from_neutral(result).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Order {
        #[serde(rename = "Id")]
        id: String,
    }

    #[test]
    fn map_and_typed_sources_agree() {
        let map: HashMap<&str, &str> = HashMap::from([("Id", "678")]);
        let from_map: Order = to_typed(&map).unwrap();
        let from_typed: Order = to_typed(&Order { id: "678".into() }).unwrap();
        assert_eq!(from_map, from_typed);
    }

    #[test]
    fn null_results_become_none() {
        assert_eq!(to_requested::<Order>(Value::Null).unwrap(), None);
        assert_eq!(to_requested::<String>(to_neutral(&()).unwrap()).unwrap(), None);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let err = to_typed::<_, Order>(&json!({ "Id": 5 })).unwrap_err();
        assert!(matches!(err, TranslateError::PayloadShape { .. }));
    }
}
