//! Tagged values exchanged with the workspace engine.
//!
//! The engine is dynamically typed: a call may produce nothing, a scalar, a
//! heterogeneous sequence, or a homogeneous multidimensional array. `Variant`
//! names each case explicitly so the gateway and callers can match them
//! exhaustively.

pub mod json;
pub mod transpose;

pub use transpose::{transpose, transpose_variant};

use crate::error::BridgeError;

/// A single value produced by or passed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// The engine produced nothing
    Empty,
    Str(String),
    Int(i32),
    Bool(bool),
    Double(f64),
    /// Ordered, heterogeneous list of values
    Sequence(Vec<Variant>),
    Array(VariantArray),
}

impl Variant {
    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Variant::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Textual form used by the identity properties.
    ///
    /// Scalars render with `to_string`, `Empty` becomes an empty string and
    /// composite values fall back to their JSON rendering.
    pub fn into_text(self) -> String {
        match self {
            Variant::Empty => String::new(),
            Variant::Str(value) => value,
            Variant::Int(value) => value.to_string(),
            Variant::Bool(value) => value.to_string(),
            Variant::Double(value) => value.to_string(),
            other => other.to_json().to_string(),
        }
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Str(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Str(value)
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::Int(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Double(value)
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<VariantArray> for Variant {
    fn from(value: VariantArray) -> Self {
        Variant::Array(value)
    }
}

impl From<Vec<Variant>> for Variant {
    fn from(values: Vec<Variant>) -> Self {
        Variant::Sequence(values)
    }
}

/// Homogeneous array stored row-major (last dimension varies fastest).
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> Array<T> {
    /// Build an array from its shape and row-major data.
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<Self, BridgeError> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, d| acc.checked_mul(*d))
            .ok_or(BridgeError::InvalidShape {
                expected: usize::MAX,
                actual: data.len(),
            })?;
        if expected != data.len() {
            return Err(BridgeError::InvalidShape {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Build a rank-2 array from a list of rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, BridgeError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(BridgeError::InvalidShape {
                    expected: n_rows * n_cols,
                    actual: data.len() + row.len(),
                });
            }
            data.extend(row);
        }
        Self::new(vec![n_rows, n_cols], data)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Inclusive upper bound of a dimension, `None` for empty or missing dims.
    pub fn upper_bound(&self, dim: usize) -> Option<usize> {
        self.shape.get(dim).and_then(|len| len.checked_sub(1))
    }

    /// Element at `[row, col]` of a rank-2 array.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if self.rank() != 2 || row >= self.shape[0] || col >= self.shape[1] {
            return None;
        }
        self.data.get(row * self.shape[1] + col)
    }

    /// Rows of a rank-2 array, `None` for any other rank.
    pub fn rows(&self) -> Option<Vec<&[T]>> {
        if self.rank() != 2 {
            return None;
        }
        let cols = self.shape[1];
        if cols == 0 {
            return Some(vec![&self.data[..0]; self.shape[0]]);
        }
        Some(self.data.chunks(cols).collect())
    }
}

/// Multidimensional array tagged by element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantArray {
    Int(Array<i32>),
    Double(Array<f64>),
    Bool(Array<bool>),
    /// Generic elements, any variant per cell
    Object(Array<Variant>),
    /// Character data
    Text(Array<String>),
}

impl VariantArray {
    pub fn shape(&self) -> &[usize] {
        match self {
            VariantArray::Int(a) => a.shape(),
            VariantArray::Double(a) => a.shape(),
            VariantArray::Bool(a) => a.shape(),
            VariantArray::Object(a) => a.shape(),
            VariantArray::Text(a) => a.shape(),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            VariantArray::Int(_) => "int",
            VariantArray::Double(_) => "double",
            VariantArray::Bool(_) => "bool",
            VariantArray::Object(_) => "object",
            VariantArray::Text(_) => "text",
        }
    }
}
