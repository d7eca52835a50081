//! Backend-neutral scalar values exchanged through the [`Database`](crate::Database) contract.

use std::fmt;

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Double(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Consume the value, returning the text if it is [`Value::Text`].
    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<duckdb::types::Value> for Value {
    fn from(value: duckdb::types::Value) -> Self {
        use duckdb::types::Value as Raw;
        match value {
            Raw::Null => Value::Null,
            Raw::Boolean(b) => Value::Boolean(b),
            Raw::TinyInt(n) => Value::Integer(n.into()),
            Raw::SmallInt(n) => Value::Integer(n.into()),
            Raw::Int(n) => Value::Integer(n.into()),
            Raw::BigInt(n) => Value::Integer(n),
            Raw::UTinyInt(n) => Value::Integer(n.into()),
            Raw::USmallInt(n) => Value::Integer(n.into()),
            Raw::UInt(n) => Value::Integer(n.into()),
            Raw::Float(n) => Value::Double(n.into()),
            Raw::Double(n) => Value::Double(n),
            Raw::Text(s) => Value::Text(s),
            other => Value::Text(format!("{other:?}")),
        }
    }
}

impl duckdb::ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<duckdb::types::ToSqlOutput<'_>> {
        use duckdb::types::{ToSqlOutput, Value as Raw};
        let raw = match self {
            Value::Null => Raw::Null,
            Value::Integer(n) => Raw::BigInt(*n),
            Value::Double(d) => Raw::Double(*d),
            Value::Text(s) => Raw::Text(s.clone()),
            Value::Boolean(b) => Raw::Boolean(*b),
        };
        Ok(ToSqlOutput::Owned(raw))
    }
}
