//! Observed data fields.
//!
//! Data never carries derivative information, so it is stored as plain
//! `f64`. Missing observations inside vectors and matrices are encoded as
//! `NaN` (`null` in JSON) and skipped by the likelihood helpers.

use std::collections::BTreeMap;

use crate::types::BundleError;

/// Row-major matrix of observations (years × ages, years × fleets, ...).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
    /// Row-major values, length `rows * cols`
    #[cfg_attr(feature = "serde", serde(deserialize_with = "nullable::deserialize"))]
    pub values: Vec<f64>,
}

impl Matrix {
    /// Create a matrix, checking the buffer length.
    ///
    /// # Returns
    /// `None` if `values.len() != rows * cols`
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Option<Self> {
        if values.len() != rows * cols {
            return None;
        }
        Some(Self { rows, cols, values })
    }

    /// Build from nested rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let values = rows.iter().flatten().copied().collect();
        Some(Self {
            rows: rows.len(),
            cols,
            values,
        })
    }

    /// Matrix of a constant value.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            values: vec![value; rows * cols],
        }
    }

    /// Element at `(r, c)`.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.values[r * self.cols + c]
    }

    /// Row slice.
    #[inline]
    pub fn row(&self, r: usize) -> &[f64] {
        &self.values[r * self.cols..(r + 1) * self.cols]
    }
}

/// A single observed data field.
///
/// Deserialisation is untagged: integers become `Integer`, other numbers
/// `Scalar`, strings `Text`, arrays `Vector`, and `{rows, cols, values}`
/// objects `Matrix`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum DataValue {
    /// Integer (ages, lags, iteration counts)
    Integer(i64),
    /// Real scalar
    Scalar(f64),
    /// Text switch ("BH", "Ricker", ...)
    Text(String),
    /// Time series or per-age vector
    Vector(#[cfg_attr(feature = "serde", serde(deserialize_with = "nullable::deserialize"))] Vec<f64>),
    /// Two-dimensional observations
    Matrix(Matrix),
}

impl DataValue {
    /// Kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DataValue::Integer(_) => "integer",
            DataValue::Scalar(_) => "scalar",
            DataValue::Text(_) => "text",
            DataValue::Vector(_) => "vector",
            DataValue::Matrix(_) => "matrix",
        }
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Scalar(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Integer(v)
    }
}

impl From<Vec<f64>> for DataValue {
    fn from(v: Vec<f64>) -> Self {
        DataValue::Vector(v)
    }
}

impl From<Matrix> for DataValue {
    fn from(m: Matrix) -> Self {
        DataValue::Matrix(m)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::Text(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::Text(s)
    }
}

/// Named observed data fields.
///
/// # Examples
/// ```
/// use stock_core::bundle::{DataSet, Matrix};
///
/// let mut data = DataSet::new();
/// data.insert("M", 0.2);
/// data.insert("k", 2_i64);
/// data.insert("CAA_hist", Matrix::filled(3, 4, 0.25));
///
/// assert_eq!(data.integer("k").unwrap(), 2);
/// assert_eq!(data.matrix_shape("CAA_hist", 3, 4).unwrap().get(2, 3), 0.25);
/// assert!(data.scalar("I_hist").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DataSet {
    fields: BTreeMap<String, DataValue>,
}

impl DataSet {
    /// Create an empty data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Raw field lookup.
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields.get(name)
    }

    /// Check whether a field exists.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    fn require(&self, name: &str) -> Result<&DataValue, BundleError> {
        self.fields
            .get(name)
            .ok_or_else(|| BundleError::MissingData(name.to_string()))
    }

    fn wrong_kind(name: &str, expected: &'static str, found: &DataValue) -> BundleError {
        BundleError::WrongKind {
            name: name.to_string(),
            expected,
            found: found.kind(),
        }
    }

    /// Real scalar. Integers are widened.
    pub fn scalar(&self, name: &str) -> Result<f64, BundleError> {
        match self.require(name)? {
            DataValue::Scalar(v) => Ok(*v),
            DataValue::Integer(v) => Ok(*v as f64),
            other => Err(Self::wrong_kind(name, "scalar", other)),
        }
    }

    /// Real scalar with a default when the field is absent.
    pub fn scalar_or(&self, name: &str, default: f64) -> Result<f64, BundleError> {
        if self.contains(name) {
            self.scalar(name)
        } else {
            Ok(default)
        }
    }

    /// Integer. Real scalars with no fractional part are accepted.
    pub fn integer(&self, name: &str) -> Result<i64, BundleError> {
        match self.require(name)? {
            DataValue::Integer(v) => Ok(*v),
            DataValue::Scalar(v) if v.fract() == 0.0 => Ok(*v as i64),
            other => Err(Self::wrong_kind(name, "integer", other)),
        }
    }

    /// Integer with a default when the field is absent.
    pub fn integer_or(&self, name: &str, default: i64) -> Result<i64, BundleError> {
        if self.contains(name) {
            self.integer(name)
        } else {
            Ok(default)
        }
    }

    /// Text switch.
    pub fn text(&self, name: &str) -> Result<&str, BundleError> {
        match self.require(name)? {
            DataValue::Text(s) => Ok(s.as_str()),
            other => Err(Self::wrong_kind(name, "text", other)),
        }
    }

    /// Text switch with a default when the field is absent.
    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, BundleError> {
        if self.contains(name) {
            self.text(name)
        } else {
            Ok(default)
        }
    }

    /// Vector of any length. A scalar is not promoted.
    pub fn vector(&self, name: &str) -> Result<&[f64], BundleError> {
        match self.require(name)? {
            DataValue::Vector(v) => Ok(v.as_slice()),
            other => Err(Self::wrong_kind(name, "vector", other)),
        }
    }

    /// Vector of an exact length.
    pub fn vector_len(&self, name: &str, expected: usize) -> Result<&[f64], BundleError> {
        let v = self.vector(name)?;
        if v.len() != expected {
            return Err(BundleError::LengthMismatch {
                name: name.to_string(),
                expected,
                got: v.len(),
            });
        }
        Ok(v)
    }

    /// Matrix of any shape. The buffer length is checked.
    pub fn matrix(&self, name: &str) -> Result<&Matrix, BundleError> {
        match self.require(name)? {
            DataValue::Matrix(m) if m.values.len() == m.rows * m.cols => Ok(m),
            DataValue::Matrix(m) => Err(BundleError::LengthMismatch {
                name: name.to_string(),
                expected: m.rows * m.cols,
                got: m.values.len(),
            }),
            other => Err(Self::wrong_kind(name, "matrix", other)),
        }
    }

    /// Matrix of an exact shape.
    pub fn matrix_shape(
        &self,
        name: &str,
        rows: usize,
        cols: usize,
    ) -> Result<&Matrix, BundleError> {
        let m = self.matrix(name)?;
        if m.rows != rows || m.cols != cols {
            return Err(BundleError::ShapeMismatch {
                name: name.to_string(),
                rows: m.rows,
                cols: m.cols,
                expected_rows: rows,
                expected_cols: cols,
            });
        }
        Ok(m)
    }
}

#[cfg(feature = "serde")]
mod nullable {
    use serde::{Deserialize, Deserializer};

    /// Accept `null` entries as missing observations (`NaN`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}
