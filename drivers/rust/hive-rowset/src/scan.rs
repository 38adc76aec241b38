//! Typed destinations for `RowSet::scan`.
//!
//! Supported destinations:
//!  - `String`: strings copy verbatim, anything else is rendered as text
//!  - `Vec<u8>`: string values only, copied as raw bytes
//!  - `i64`, `i32`, `i16`, `bool`, `f64`: exact runtime type only
//!  - `Value`: anything, including NULL

use crate::error::{Error, Result};
use crate::value::Value;

/// A destination slot that can receive one column value.
pub trait ScanTarget {
    /// Destination type name used in mismatch errors.
    fn type_name(&self) -> &'static str;

    fn scan_from(&mut self, value: &Value) -> Result<()>;
}

fn mismatch(destination: &'static str, value: &Value) -> Error {
    Error::TypeMismatch {
        destination,
        value: format!("{:?}", value),
    }
}

impl ScanTarget for String {
    fn type_name(&self) -> &'static str {
        "String"
    }

    fn scan_from(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.clone_from(s),
            other => *self = other.to_string(),
        }
        Ok(())
    }
}

impl ScanTarget for Vec<u8> {
    fn type_name(&self) -> &'static str {
        "Vec<u8>"
    }

    fn scan_from(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => {
                self.clear();
                self.extend_from_slice(s.as_bytes());
                Ok(())
            }
            other => Err(mismatch(self.type_name(), other)),
        }
    }
}

macro_rules! exact_target {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl ScanTarget for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn scan_from(&mut self, value: &Value) -> Result<()> {
                match value {
                    Value::$variant(v) => {
                        *self = *v;
                        Ok(())
                    }
                    other => Err(mismatch($name, other)),
                }
            }
        }
    };
}

exact_target!(i64, I64, "i64");
exact_target!(i32, I32, "i32");
exact_target!(i16, I16, "i16");
exact_target!(bool, Bool, "bool");
exact_target!(f64, F64, "f64");

impl ScanTarget for Value {
    fn type_name(&self) -> &'static str {
        "Value"
    }

    fn scan_from(&mut self, value: &Value) -> Result<()> {
        self.clone_from(value);
        Ok(())
    }
}

/// Copy `row` into `dest`, one destination per column.
pub fn scan_row(row: &[Value], dest: &mut [&mut dyn ScanTarget]) -> Result<()> {
    if dest.len() != row.len() {
        return Err(Error::Arity {
            expected: row.len(),
            actual: dest.len(),
        });
    }

    for (slot, value) in dest.iter_mut().zip(row) {
        slot.scan_from(value)?;
    }
    Ok(())
}
