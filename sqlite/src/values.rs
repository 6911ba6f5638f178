//! Conversions between quarry values and SQLite values.

use quarry_core::Value;
use rusqlite::types::{ToSqlOutput, ValueRef};

/// Errors converting a column read from SQLite
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// Column holds a BLOB, which has no quarry counterpart
    #[error("BLOB column {0} cannot be read as a value")]
    Blob(usize),

    /// TEXT column is not valid UTF-8
    #[error("TEXT column {0} is not valid UTF-8")]
    InvalidText(usize),
}

/// Binds a [`Value`] as a statement parameter. Booleans are stored as 0/1.
#[derive(Debug, Clone, Copy)]
pub struct SqliteParam<'a>(pub &'a Value);

impl rusqlite::ToSql for SqliteParam<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*f)),
            Value::Boolean(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*b))),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Reads column `index` of a result row.
pub fn from_value_ref(index: usize, value: ValueRef<'_>) -> Result<Value, ValueError> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|_| ValueError::InvalidText(index))?;
            Value::Text(text.into())
        }
        ValueRef::Blob(_) => return Err(ValueError::Blob(index)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ToSql;

    #[test]
    fn booleans_bind_as_integers() {
        let value = Value::Boolean(true);
        let param = SqliteParam(&value);
        let output = param.to_sql().unwrap();
        assert!(matches!(
            output,
            ToSqlOutput::Owned(rusqlite::types::Value::Integer(1))
        ));
    }

    #[test]
    fn blobs_are_rejected() {
        let err = from_value_ref(2, ValueRef::Blob(&[1, 2])).unwrap_err();
        assert!(matches!(err, ValueError::Blob(2)));
    }

    #[test]
    fn text_is_read_as_text() {
        let value = from_value_ref(0, ValueRef::Text(b"member1")).unwrap();
        assert_eq!(value, Value::from("member1"));
    }
}
