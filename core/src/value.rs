//! Opaque column values exchanged with the store.

use compact_str::CompactString;
use core::fmt;

use crate::error::{QueryError, Result};
use crate::types::ScalarKind;

/// A single bound parameter or result column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(CompactString),
    Boolean(bool),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Kind of the value, `None` for NULL.
    pub const fn kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ScalarKind::Integer),
            Value::Real(_) => Some(ScalarKind::Decimal),
            Value::Text(_) => Some(ScalarKind::String),
            Value::Boolean(_) => Some(ScalarKind::Boolean),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{v}'"),
            Value::Boolean(v) => write!(f, "{v}"),
        }
    }
}

// ==================== conversions into Value ====================

macro_rules! impl_from_integer {
    ($($ty:ty),*) => { $(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Value::Integer(value as i64)
            }
        }
    )* }
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::Real(value as f64)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Text(CompactString::from(value))
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::Text(CompactString::from(value))
    }
}

impl From<CompactString> for Value {
    #[inline]
    fn from(value: CompactString) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// ==================== conversions out of Value ====================

/// Conversion from a result column into a Rust value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T>(value: &Value, expected: &str) -> Result<T> {
    Err(QueryError::ProjectionError(format!(
        "cannot read {} column as {expected}",
        value.describe()
    )))
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(v) => Ok(v),
            Value::Boolean(v) => Ok(v as i64),
            Value::Real(v) if v.fract() == 0.0 => Ok(v as i64),
            other => mismatch(&other, "integer"),
        }
    }
}

macro_rules! impl_from_value_narrow {
    ($($ty:ty),*) => { $(
        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                let wide = i64::from_value(value)?;
                <$ty>::try_from(wide).map_err(|_| {
                    QueryError::ProjectionError(format!(
                        "integer {wide} out of range for {}",
                        stringify!($ty)
                    ))
                })
            }
        }
    )* }
}

impl_from_value_narrow!(i32, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            other => mismatch(&other, "real"),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(v) => Ok(v),
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            other => mismatch(&other, "boolean"),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v.into_string()),
            other => mismatch(&other, "text"),
        }
    }
}

impl FromValue for CompactString {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            other => mismatch(&other, "text"),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_columns_widen_to_real() {
        assert_eq!(f64::from_value(Value::Integer(25)).unwrap(), 25.0);
    }

    #[test]
    fn integral_real_narrows_to_integer() {
        assert_eq!(i32::from_value(Value::Real(40.0)).unwrap(), 40);
        assert!(i32::from_value(Value::Real(40.5)).is_err());
    }

    #[test]
    fn null_reads_as_none() {
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert!(String::from_value(Value::Null).is_err());
    }
}
