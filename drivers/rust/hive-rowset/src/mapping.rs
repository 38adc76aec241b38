//! Mapping rows onto caller-defined records.
//!
//! A [`RecordMapper`] lists which column feeds which field of a record type.
//! Rows are pulled through [`RowSet::scan`] into dynamic [`Value`] slots and
//! each registered field is filled with a lenient conversion, so a numeric
//! column can land in a `String` field and a textual `"42"` in an `i64`.
//!
//! ```rust,ignore
//! let mapper = RecordMapper::<Visit>::new()
//!     .field("user_id", |v: &mut Visit, id: i64| v.user_id = id)
//!     .field("page", |v: &mut Visit, page: String| v.page = page)
//!     .field("at", |v: &mut Visit, at: Option<DateTime<Utc>>| v.at = at);
//!
//! while rows.next() {
//!     let visit = rows.scan_record(&mapper)?;
//! }
//! ```

use crate::error::{Error, Result};
use crate::rowset::RowSet;
use crate::scan::ScanTarget;
use crate::service::OperationService;
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::fmt;

/// A field type that can be built from a column value.
///
/// `Ok(None)` means the value was NULL and the field keeps its default.
pub trait FieldValue: Sized {
    fn from_value(value: &Value) -> Result<Option<Self>>;
}

fn not_convertible(destination: &'static str, value: &Value) -> Error {
    Error::TypeMismatch {
        destination,
        value: format!("{:?}", value),
    }
}

impl FieldValue for String {
    fn from_value(value: &Value) -> Result<Option<Self>> {
        Ok(match value {
            Value::Null => None,
            other => Some(other.to_string()),
        })
    }
}

macro_rules! integer_field {
    ($ty:ty, $name:literal) => {
        impl FieldValue for $ty {
            fn from_value(value: &Value) -> Result<Option<Self>> {
                let converted = match value {
                    Value::Null => return Ok(None),
                    Value::I16(v) => <$ty>::try_from(*v).ok(),
                    Value::I32(v) => <$ty>::try_from(*v).ok(),
                    Value::I64(v) => <$ty>::try_from(*v).ok(),
                    other => other.to_string().trim().parse::<$ty>().ok(),
                };
                converted
                    .map(Some)
                    .ok_or_else(|| not_convertible($name, value))
            }
        }
    };
}

integer_field!(i64, "i64");
integer_field!(i32, "i32");

impl FieldValue for f64 {
    fn from_value(value: &Value) -> Result<Option<Self>> {
        let converted = match value {
            Value::Null => return Ok(None),
            Value::F64(v) => Some(*v),
            Value::I16(v) => Some(f64::from(*v)),
            Value::I32(v) => Some(f64::from(*v)),
            Value::I64(v) => Some(*v as f64),
            other => other.to_string().trim().parse::<f64>().ok(),
        };
        converted
            .map(Some)
            .ok_or_else(|| not_convertible("f64", value))
    }
}

impl FieldValue for bool {
    fn from_value(value: &Value) -> Result<Option<Self>> {
        let converted = match value {
            Value::Null => return Ok(None),
            Value::Bool(v) => Some(*v),
            other => match other.to_string().trim() {
                "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
                "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
                _ => None,
            },
        };
        converted
            .map(Some)
            .ok_or_else(|| not_convertible("bool", value))
    }
}

/// RFC 3339 timestamps.
impl FieldValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(value.to_string().trim())
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|_| not_convertible("DateTime<Utc>", value))
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn from_value(value: &Value) -> Result<Option<Self>> {
        if value.is_null() {
            return Ok(Some(None));
        }
        Ok(T::from_value(value)?.map(Some))
    }
}

type Setter<T> = Box<dyn Fn(&mut T, &Value) -> Result<()> + Send + Sync>;

/// Column-to-field registrations for a record type.
pub struct RecordMapper<T> {
    fields: Vec<(String, Setter<T>)>,
}

impl<T: Default> RecordMapper<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Register `set` for `column`; matching ignores case and any
    /// `table.` qualifier on the result column.
    pub fn field<V, F>(mut self, column: &str, set: F) -> Self
    where
        V: FieldValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter: Setter<T> = Box::new(move |record, value| {
            if let Some(v) = V::from_value(value)? {
                set(record, v);
            }
            Ok(())
        });
        self.fields.push((column.to_lowercase(), setter));
        self
    }

    /// Build a record from a row and its column names.
    pub fn map(&self, columns: &[String], row: &[Value]) -> Result<T> {
        if columns.len() != row.len() {
            return Err(Error::Arity {
                expected: columns.len(),
                actual: row.len(),
            });
        }

        let mut record = T::default();
        for (name, value) in columns.iter().zip(row) {
            let name = normalize_column(name);
            for (field, set) in &self.fields {
                if *field == name {
                    set(&mut record, value)?;
                }
            }
        }
        Ok(record)
    }
}

impl<T: Default> Default for RecordMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RecordMapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|(name, _)| name))
            .finish()
    }
}

/// `visits.Page` -> `page`; names with more than one dot are kept whole.
fn normalize_column(name: &str) -> String {
    let column = match name.split_once('.') {
        Some((_, column)) if !column.contains('.') => column,
        _ => name,
    };
    column.to_lowercase()
}

impl<S: OperationService> RowSet<S> {
    /// Scan the current row into a record built by `mapper`.
    pub fn scan_record<T: Default>(&mut self, mapper: &RecordMapper<T>) -> Result<T> {
        let width = self.current_row().ok_or(Error::NoCurrentRow)?.len();
        let mut values = vec![Value::Null; width];
        {
            let mut slots: Vec<&mut dyn ScanTarget> = values
                .iter_mut()
                .map(|v| v as &mut dyn ScanTarget)
                .collect();
            self.scan(&mut slots)?;
        }
        let columns = self.columns().to_vec();
        mapper.map(&columns, &values)
    }
}
