//! FromValue trait for converting column values to Rust types

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Trait for types that can be constructed from a column value.
///
/// This is the typed accessor a cursor exposes: record fields are filled by
/// calling `from_value` with the field's declared type. `Option<T>` is the
/// nullable wrapper and unwraps to `T` for the conversion itself.
///
/// Implement it manually for custom field types (e.g., enums stored as text).
pub trait FromValue: Sized {
    /// Convert a column value to this type.
    fn from_value(value: Value) -> Result<Self>;

    /// Convert a column value bound to a record field.
    ///
    /// SQL NULL yields `Self::default()` instead of an error, so a nullable
    /// column read into a plain field leaves it at its default and an
    /// `Option<T>` field gets an explicit `None`.
    fn from_field_value(value: Value) -> Result<Self>
    where
        Self: Default,
    {
        if value.is_null() {
            Ok(Self::default())
        } else {
            Self::from_value(value)
        }
    }
}

fn mismatch(expected: &'static str, value: &Value) -> Error {
    match value {
        Value::Null => Error::UnexpectedNull(expected),
        other => Error::TypeConversion {
            expected,
            actual: other.type_name().to_string(),
        },
    }
}

fn out_of_range(expected: &'static str, actual: impl std::fmt::Display) -> Error {
    Error::TypeConversion {
        expected,
        actual: format!("{} out of range", actual),
    }
}

// Integers widen freely and narrow with a range check; drivers rarely report
// the exact declared width (MySQL returns every integer as i64/u64).
macro_rules! impl_from_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    let name = stringify!($ty);
                    match value {
                        Value::I8(v) => <$ty>::try_from(v).map_err(|_| out_of_range(name, format!("i8({})", v))),
                        Value::I16(v) => <$ty>::try_from(v).map_err(|_| out_of_range(name, format!("i16({})", v))),
                        Value::I32(v) => <$ty>::try_from(v).map_err(|_| out_of_range(name, format!("i32({})", v))),
                        Value::I64(v) => <$ty>::try_from(v).map_err(|_| out_of_range(name, format!("i64({})", v))),
                        Value::U8(v) => <$ty>::try_from(v).map_err(|_| out_of_range(name, format!("u8({})", v))),
                        Value::U16(v) => <$ty>::try_from(v).map_err(|_| out_of_range(name, format!("u16({})", v))),
                        Value::U32(v) => <$ty>::try_from(v).map_err(|_| out_of_range(name, format!("u32({})", v))),
                        Value::U64(v) => <$ty>::try_from(v).map_err(|_| out_of_range(name, format!("u64({})", v))),
                        other => Err(mismatch(name, &other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::I8(v) => Ok(v != 0),
            Value::I16(v) => Ok(v != 0),
            Value::I32(v) => Ok(v != 0),
            Value::I64(v) => Ok(v != 0),
            Value::U8(v) => Ok(v != 0),
            Value::U16(v) => Ok(v != 0),
            Value::U32(v) => Ok(v != 0),
            Value::U64(v) => Ok(v != 0),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v),
            Value::F64(v) => Ok(v as f32),
            other => Err(mismatch("f32", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v as f64),
            Value::F64(v) => Ok(v),
            Value::I8(v) => Ok(v.into()),
            Value::I16(v) => Ok(v.into()),
            Value::I32(v) => Ok(v.into()),
            Value::I64(v) => Ok(v as f64),
            Value::U8(v) => Ok(v.into()),
            Value::U16(v) => Ok(v.into()),
            Value::U32(v) => Ok(v.into()),
            Value::U64(v) => Ok(v as f64),
            Value::Decimal(v) => v.to_string().parse().map_err(|_| Error::TypeConversion {
                expected: "f64",
                actual: format!("decimal {}", v),
            }),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            Value::Bytes(v) => String::from_utf8(v).map_err(|e| Error::TypeConversion {
                expected: "utf8 string",
                actual: format!("invalid utf8: {}", e),
            }),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::String(v) => Ok(v.into_bytes()),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            other => Err(mismatch("date", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Date(v) => Ok(v.and_time(NaiveTime::MIN)),
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(v) => Ok(v),
            Value::DateTime(v) => Ok(v.time()),
            other => Err(mismatch("time", &other)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::I64(v) => Ok(Decimal::from(v)),
            Value::U64(v) => Ok(Decimal::from(v)),
            Value::String(v) => v.parse().map_err(|_| Error::TypeConversion {
                expected: "decimal",
                actual: format!("invalid decimal string: {}", v),
            }),
            other => Err(mismatch("decimal", &other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(v) => Ok(v),
            Value::String(v) => serde_json::from_str(&v).map_err(|e| Error::TypeConversion {
                expected: "json",
                actual: format!("invalid json: {}", e),
            }),
            other => Err(mismatch("json", &other)),
        }
    }
}

/// Pass-through for positional arrays and untyped transforms.
impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

// The nullable wrapper: NULL becomes an explicit `None`, never `T::default()`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}
