//! JSON marshaling for variants.
//!
//! Used by the command-line harness and by hosts that exchange parameters as
//! JSON text. Rectangular arrays of arrays with a single scalar kind become
//! rank-2 arrays; every other JSON array becomes a `Sequence`.

use serde_json::{json, Map, Number, Value};

use super::{Array, Variant, VariantArray};
use crate::error::BridgeError;

#[derive(Clone, Copy, PartialEq)]
enum Kind {
    Int,
    Double,
    Bool,
    Text,
    Object,
}

fn scalar_kind(value: &Value) -> Kind {
    match value {
        Value::Bool(_) => Kind::Bool,
        Value::String(_) => Kind::Text,
        Value::Number(n) if fits_i32(n) => Kind::Int,
        Value::Number(_) => Kind::Double,
        _ => Kind::Object,
    }
}

fn fits_i32(n: &Number) -> bool {
    n.as_i64()
        .map(|v| v >= i64::from(i32::MIN) && v <= i64::from(i32::MAX))
        .unwrap_or(false)
}

fn common_kind<'a>(values: impl Iterator<Item = &'a Value>) -> Kind {
    let mut kind = None;
    for value in values {
        let next = scalar_kind(value);
        kind = Some(match (kind, next) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(Kind::Int), Kind::Double) | (Some(Kind::Double), Kind::Int) => Kind::Double,
            _ => Kind::Object,
        });
    }
    kind.unwrap_or(Kind::Object)
}

fn build_array(kind: Kind, shape: Vec<usize>, flat: &[Value]) -> Result<VariantArray, BridgeError> {
    Ok(match kind {
        Kind::Int => VariantArray::Int(Array::new(
            shape,
            flat.iter()
                .map(|v| v.as_i64().unwrap_or_default() as i32)
                .collect(),
        )?),
        Kind::Double => VariantArray::Double(Array::new(
            shape,
            flat.iter().map(|v| v.as_f64().unwrap_or_default()).collect(),
        )?),
        Kind::Bool => VariantArray::Bool(Array::new(
            shape,
            flat.iter().map(|v| v.as_bool().unwrap_or_default()).collect(),
        )?),
        Kind::Text => VariantArray::Text(Array::new(
            shape,
            flat.iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect(),
        )?),
        Kind::Object => VariantArray::Object(Array::new(
            shape,
            flat.iter()
                .map(Variant::from_json)
                .collect::<Result<Vec<_>, _>>()?,
        )?),
    })
}

/// Rows of equal, non-zero length; `None` when the array is not a matrix.
fn matrix_rows(items: &[Value]) -> Option<(usize, Vec<Value>)> {
    let first = items.first()?.as_array()?;
    let n_cols = first.len();
    if n_cols == 0 {
        return None;
    }
    let mut flat = Vec::with_capacity(items.len() * n_cols);
    for item in items {
        let row = item.as_array()?;
        if row.len() != n_cols {
            return None;
        }
        flat.extend(row.iter().cloned());
    }
    Some((n_cols, flat))
}

/// One entry of a `{"shape": [...]}` object; must be a non-negative integer.
fn dimension(value: &Value) -> Result<usize, BridgeError> {
    value
        .as_u64()
        .and_then(|d| usize::try_from(d).ok())
        .ok_or_else(|| BridgeError::Marshal {
            reason: format!("array dimension {} is not a non-negative integer", value),
        })
}

impl Variant {
    /// Convert a JSON value into a variant.
    ///
    /// Objects of the form `{"shape": [...], "data": [...]}` become arrays of
    /// arbitrary rank; any other object is passed as its JSON text.
    pub fn from_json(value: &Value) -> Result<Variant, BridgeError> {
        Ok(match value {
            Value::Null => Variant::Empty,
            Value::Bool(b) => Variant::Bool(*b),
            Value::String(s) => Variant::Str(s.clone()),
            Value::Number(n) if fits_i32(n) => Variant::Int(n.as_i64().unwrap_or_default() as i32),
            Value::Number(n) => Variant::Double(n.as_f64().unwrap_or_default()),
            Value::Array(items) => match matrix_rows(items) {
                Some((n_cols, flat)) => {
                    let kind = common_kind(flat.iter());
                    Variant::Array(build_array(kind, vec![items.len(), n_cols], &flat)?)
                }
                None => Variant::Sequence(
                    items
                        .iter()
                        .map(Variant::from_json)
                        .collect::<Result<Vec<_>, _>>()?,
                ),
            },
            Value::Object(map) => match (map.get("shape"), map.get("data")) {
                (Some(Value::Array(shape)), Some(Value::Array(data))) => {
                    let shape = shape
                        .iter()
                        .map(dimension)
                        .collect::<Result<Vec<_>, _>>()?;
                    let kind = common_kind(data.iter());
                    Variant::Array(build_array(kind, shape, data)?)
                }
                _ => Variant::Str(value.to_string()),
            },
        })
    }

    /// Convert a variant into JSON.
    ///
    /// Rank-2 arrays render as a list of rows; other ranks render as
    /// `{"shape": [...], "data": [...]}` with row-major data.
    pub fn to_json(&self) -> Value {
        match self {
            Variant::Empty => Value::Null,
            Variant::Str(s) => Value::String(s.clone()),
            Variant::Int(i) => json!(i),
            Variant::Bool(b) => Value::Bool(*b),
            Variant::Double(d) => Number::from_f64(*d).map(Value::Number).unwrap_or(Value::Null),
            Variant::Sequence(items) => Value::Array(items.iter().map(Variant::to_json).collect()),
            Variant::Array(array) => array_to_json(array),
        }
    }
}

fn array_to_json(array: &VariantArray) -> Value {
    match array {
        VariantArray::Int(a) => shaped_json(a, |v| json!(v)),
        VariantArray::Double(a) => {
            shaped_json(a, |v| Number::from_f64(*v).map(Value::Number).unwrap_or(Value::Null))
        }
        VariantArray::Bool(a) => shaped_json(a, |v| Value::Bool(*v)),
        VariantArray::Object(a) => shaped_json(a, Variant::to_json),
        VariantArray::Text(a) => shaped_json(a, |v| Value::String(v.clone())),
    }
}

fn shaped_json<T>(array: &Array<T>, cell: impl Fn(&T) -> Value) -> Value {
    if let Some(rows) = array.rows() {
        return Value::Array(
            rows.into_iter()
                .map(|row| Value::Array(row.iter().map(&cell).collect()))
                .collect(),
        );
    }
    let mut map = Map::new();
    map.insert("shape".to_string(), json!(array.shape()));
    map.insert(
        "data".to_string(),
        Value::Array(array.data().iter().map(&cell).collect()),
    );
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(Variant::from_json(&json!(null)).unwrap(), Variant::Empty);
        assert_eq!(Variant::from_json(&json!(3)).unwrap(), Variant::Int(3));
        assert_eq!(Variant::from_json(&json!(2.5)).unwrap(), Variant::Double(2.5));
        assert_eq!(
            Variant::from_json(&json!(4_000_000_000_i64)).unwrap(),
            Variant::Double(4_000_000_000.0)
        );
        assert_eq!(Variant::from_json(&json!("x")).unwrap(), Variant::from("x"));
    }

    #[test]
    fn test_flat_list_is_sequence() {
        assert_eq!(
            Variant::from_json(&json!([3, 4])).unwrap(),
            Variant::Sequence(vec![Variant::Int(3), Variant::Int(4)])
        );
    }

    #[test]
    fn test_rectangular_list_is_matrix() {
        let value = Variant::from_json(&json!([[1, 2, 3], [4, 5, 6]])).unwrap();
        let expected = VariantArray::Int(Array::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap());
        assert_eq!(value, Variant::Array(expected));
    }

    #[test]
    fn test_mixed_numbers_widen_to_double() {
        match Variant::from_json(&json!([[1, 2.5]])).unwrap() {
            Variant::Array(VariantArray::Double(a)) => assert_eq!(a.data(), &[1.0, 2.5]),
            other => panic!("Expected Double matrix, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_cells_become_object_matrix() {
        match Variant::from_json(&json!([["age", 65], ["rate", 0.5]])).unwrap() {
            Variant::Array(VariantArray::Object(a)) => {
                assert_eq!(a.get(1, 0), Some(&Variant::from("rate")));
            }
            other => panic!("Expected Object matrix, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_list_is_sequence() {
        let value = Variant::from_json(&json!([[1, 2], [3]])).unwrap();
        assert!(matches!(value, Variant::Sequence(_)));
    }

    #[test]
    fn test_shaped_object() {
        let value = Variant::from_json(&json!({"shape": [2, 1, 2], "data": [1, 2, 3, 4]})).unwrap();
        match &value {
            Variant::Array(array) => assert_eq!(array.shape(), &[2, 1, 2]),
            other => panic!("Expected array, got {:?}", other),
        }
        assert_eq!(value.to_json(), json!({"shape": [2, 1, 2], "data": [1, 2, 3, 4]}));
    }

    #[test]
    fn test_shaped_object_with_bad_shape() {
        let result = Variant::from_json(&json!({"shape": [2, 2], "data": [1, 2, 3]}));
        assert!(matches!(result, Err(BridgeError::InvalidShape { .. })));
    }

    #[test]
    fn test_shaped_object_with_huge_shape() {
        let value = json!({"shape": [4294967296u64, 4294967297u64], "data": []});
        let result = Variant::from_json(&value);
        assert!(matches!(result, Err(BridgeError::InvalidShape { .. })));
    }

    #[test]
    fn test_shaped_object_rejects_bad_dimensions() {
        for shape in [json!([-5, 2]), json!([1.5, 2]), json!(["2", 2])] {
            let result = Variant::from_json(&json!({"shape": shape.clone(), "data": []}));
            match result {
                Err(BridgeError::Marshal { reason }) => assert!(reason.contains("dimension")),
                other => panic!("Expected Marshal error for {}, got {:?}", shape, other),
            }
        }
    }

    #[test]
    fn test_matrix_renders_as_rows() {
        let value = Variant::Sequence(vec![
            Variant::Int(0),
            Variant::Array(VariantArray::Bool(
                Array::from_rows(vec![vec![true], vec![false]]).unwrap(),
            )),
        ]);
        assert_eq!(value.to_json(), json!([0, [[true], [false]]]));
    }
}
