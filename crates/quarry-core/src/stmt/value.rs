use crate::{schema::ColumnType, Error, Result};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A scalar bound as a query argument or scanned from a result column.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Unsigned 32-bit integer
    U32(u32),

    /// Unsigned 64-bit integer
    U64(u64),

    /// 32-bit float
    F32(f32),

    /// 64-bit float
    F64(f64),

    /// String value. Also carries DECIMAL / NUMERIC values verbatim.
    String(String),

    /// Binary value
    Bytes(Vec<u8>),

    /// Point in time, normalized to UTC
    Time(DateTime<Utc>),

    /// A list of values, used as the right-hand side of `IN`
    List(Vec<Value>),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::I32(_) => "I32",
            Self::I64(_) => "I64",
            Self::U32(_) => "U32",
            Self::U64(_) => "U64",
            Self::F32(_) => "F32",
            Self::F64(_) => "F64",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::Time(_) => "Time",
            Self::List(_) => "List",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(*v),
            Self::I32(v) => Ok(*v != 0),
            Self::I64(v) => Ok(*v != 0),
            Self::U32(v) => Ok(*v != 0),
            Self::U64(v) => Ok(*v != 0),
            Self::String(v) => match v.trim() {
                "1" | "t" | "true" | "TRUE" => Ok(true),
                "0" | "f" | "false" | "FALSE" => Ok(false),
                _ => Err(Error::type_conversion(self.clone(), "bool")),
            },
            _ => Err(Error::type_conversion(self.clone(), "bool")),
        }
    }

    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Self::I32(v) => Ok(i64::from(*v)),
            Self::I64(v) => Ok(*v),
            Self::U32(v) => Ok(i64::from(*v)),
            Self::U64(v) => {
                i64::try_from(*v).map_err(|_| Error::type_conversion(self.clone(), "i64"))
            }
            Self::Bool(v) => Ok(i64::from(*v)),
            Self::String(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::type_conversion(self.clone(), "i64")),
            _ => Err(Error::type_conversion(self.clone(), "i64")),
        }
    }

    pub fn to_u64(&self) -> Result<u64> {
        match self {
            Self::U32(v) => Ok(u64::from(*v)),
            Self::U64(v) => Ok(*v),
            Self::I32(v) => u64::try_from(*v).map_err(|_| Error::type_conversion(self.clone(), "u64")),
            Self::I64(v) => u64::try_from(*v).map_err(|_| Error::type_conversion(self.clone(), "u64")),
            Self::String(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::type_conversion(self.clone(), "u64")),
            _ => Err(Error::type_conversion(self.clone(), "u64")),
        }
    }

    /// Numeric view of the value. DECIMAL results arrive as strings and are
    /// parsed here.
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Self::F32(v) => Ok(f64::from(*v)),
            Self::F64(v) => Ok(*v),
            Self::I32(v) => Ok(f64::from(*v)),
            Self::I64(v) => Ok(*v as f64),
            Self::U32(v) => Ok(f64::from(*v)),
            Self::U64(v) => Ok(*v as f64),
            Self::String(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::type_conversion(self.clone(), "f64")),
            _ => Err(Error::type_conversion(self.clone(), "f64")),
        }
    }

    pub fn to_time(&self) -> Result<DateTime<Utc>> {
        match self {
            Self::Time(v) => Ok(*v),
            Self::String(v) => parse_time(v).ok_or_else(|| Error::type_conversion(self.clone(), "time")),
            _ => Err(Error::type_conversion(self.clone(), "time")),
        }
    }

    /// Renders a key value as text. Primary keys are surfaced to callers as
    /// strings regardless of the column type.
    pub fn to_key_string(&self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v.clone()),
            Self::I32(v) => Ok(v.to_string()),
            Self::I64(v) => Ok(v.to_string()),
            Self::U32(v) => Ok(v.to_string()),
            Self::U64(v) => Ok(v.to_string()),
            _ => Err(Error::type_conversion(self.clone(), "key string")),
        }
    }

    /// Converts a loosely typed value into the representation used for a
    /// column of type `ty`. Null passes through.
    pub fn coerce(self, ty: ColumnType) -> Result<Value> {
        if self.is_null() {
            return Ok(self);
        }

        Ok(match ty {
            ColumnType::Bool => Value::Bool(self.to_bool()?),
            ColumnType::Int => {
                let v = self.to_i64()?;
                Value::I32(i32::try_from(v).map_err(|_| Error::type_conversion(self, "i32"))?)
            }
            ColumnType::Int64 => Value::I64(self.to_i64()?),
            ColumnType::Unsigned => {
                let v = self.to_u64()?;
                Value::U32(u32::try_from(v).map_err(|_| Error::type_conversion(self, "u32"))?)
            }
            ColumnType::Unsigned64 => Value::U64(self.to_u64()?),
            ColumnType::Float32 => Value::F32(self.to_f64()? as f32),
            ColumnType::Float64 => Value::F64(self.to_f64()?),
            ColumnType::String => match self {
                Value::String(_) => self,
                Value::Bytes(bytes) => Value::String(
                    String::from_utf8(bytes)
                        .map_err(|e| Error::type_conversion(Value::Bytes(e.into_bytes()), "String"))?,
                ),
                Value::F32(_) | Value::F64(_) | Value::I32(_) | Value::I64(_) | Value::U32(_) | Value::U64(_) => {
                    Value::String(self.to_string())
                }
                _ => return Err(Error::type_conversion(self, "String")),
            },
            ColumnType::Bytes => match self {
                Value::Bytes(_) => self,
                Value::String(s) => Value::Bytes(s.into_bytes()),
                _ => return Err(Error::type_conversion(self, "Bytes")),
            },
            ColumnType::Time => Value::Time(self.to_time()?),
        })
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS[.f]`, bare dates and
/// bare times. Zone-less inputs are taken as UTC.
pub(crate) fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Some(t.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN).and_utc());
    }
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S%.f") {
        return Some(NaiveDate::default().and_time(t).and_utc());
    }
    None
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Time(v) => write!(f, "{}", v.to_rfc3339()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// Floats compare by bit pattern so values can key the materializer's
// primary-key indexes.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (U32(a), U32(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (F32(a), F32(b)) => a.to_bits() == b.to_bits(),
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (List(a), List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::U32(v) => v.hash(state),
            Value::U64(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
            Value::Time(v) => v.hash(state),
            Value::List(v) => v.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<u32> for Value {
    fn from(src: u32) -> Self {
        Self::U32(src)
    }
}

impl From<u64> for Value {
    fn from(src: u64) -> Self {
        Self::U64(src)
    }
}

impl From<f32> for Value {
    fn from(src: f32) -> Self {
        Self::F32(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Self {
        Self::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Self {
        Self::Bytes(src)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(src: DateTime<Utc>) -> Self {
        Self::Time(src)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Self {
        match src {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(src: Vec<T>) -> Self {
        Self::List(src.into_iter().map(Into::into).collect())
    }
}
