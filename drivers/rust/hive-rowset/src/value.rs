//! Native row values and conversion from protocol rows.

use crate::error::ConversionError;
use crate::protocol::{ColumnValue, Row};
use std::fmt;

/// A dynamically typed column value of the current row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
        }
    }

    /// True for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Generic textual rendering; strings render verbatim.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

/// Convert one wire column.
///
/// Bytes widen to `I64` and 16-bit integers widen to `I32`, so the current
/// row only ever holds string, bool, i32, i64, f64 or null.
pub fn convert_column(index: usize, col: &ColumnValue) -> Result<Value, ConversionError> {
    let value = match col {
        ColumnValue::String(v) => v.clone().map(Value::String),
        ColumnValue::Bool(v) => v.map(Value::Bool),
        ColumnValue::Byte(v) => v.map(|b| Value::I64(b as i64)),
        ColumnValue::I16(v) => v.map(|n| Value::I32(n as i32)),
        ColumnValue::I32(v) => v.map(Value::I32),
        ColumnValue::I64(v) => v.map(Value::I64),
        ColumnValue::Double(v) => v.map(Value::F64),
        ColumnValue::Unset => return Err(ConversionError::UnsetColumn { index }),
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Convert a whole row, which must be exactly `width` columns wide.
pub fn convert_row(row: &Row, width: usize) -> Result<Vec<Value>, ConversionError> {
    if row.col_vals.len() != width {
        return Err(ConversionError::WidthMismatch {
            expected: width,
            actual: row.col_vals.len(),
        });
    }

    row.col_vals
        .iter()
        .enumerate()
        .map(|(i, col)| convert_column(i, col))
        .collect()
}
