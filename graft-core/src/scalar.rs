//! Scalar types and their conversion to and from [`Value`].

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::error::ConversionError;
use crate::value::Value;

/// The scalar types the engine converts between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `bool`
    Bool,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `rust_decimal::Decimal`
    Decimal,
    /// `String`
    Str,
    /// `Vec<String>` — the multi-valued form-field scalar
    StrArray,
    /// `Vec<u8>`
    Bytes,
    /// `chrono::NaiveDate`
    Date,
    /// `chrono::NaiveDateTime`
    DateTime,
}

impl ScalarType {
    /// A short name, used in conversion error messages.
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::Decimal => "decimal",
            ScalarType::Str => "string",
            ScalarType::StrArray => "string array",
            ScalarType::Bytes => "bytes",
            ScalarType::Date => "date",
            ScalarType::DateTime => "date-time",
        }
    }
}

/// A Rust type with a fixed [`ScalarType`] and a direct [`Value`] embedding.
///
/// `from_value` is the narrow placement step that runs after converters have
/// already done their work: it accepts the matching variant (widening
/// integers where lossless) and rejects everything else.
pub trait Scalar: Sized {
    /// The scalar type this Rust type carries.
    const TYPE: ScalarType;

    /// Embed into a [`Value`].
    fn into_value(self) -> Value;

    /// Extract from a [`Value`].
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

fn mismatch(value: &Value, target: ScalarType) -> ConversionError {
    ConversionError::new(value.to_string(), target.name())
}

impl Scalar for bool {
    const TYPE: ScalarType = ScalarType::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for i16 {
    const TYPE: ScalarType = ScalarType::I16;

    fn into_value(self) -> Value {
        Value::I16(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::I16(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for i32 {
    const TYPE: ScalarType = ScalarType::I32;

    fn into_value(self) -> Value {
        Value::I32(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::I16(v) => Ok(v.into()),
            Value::I32(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for i64 {
    const TYPE: ScalarType = ScalarType::I64;

    fn into_value(self) -> Value {
        Value::I64(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::I16(v) => Ok(v.into()),
            Value::I32(v) => Ok(v.into()),
            Value::I64(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for Decimal {
    const TYPE: ScalarType = ScalarType::Decimal;

    fn into_value(self) -> Value {
        Value::Decimal(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::I16(v) => Ok(Decimal::from(v)),
            Value::I32(v) => Ok(Decimal::from(v)),
            Value::I64(v) => Ok(Decimal::from(v)),
            Value::Decimal(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for String {
    const TYPE: ScalarType = ScalarType::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Str(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for Vec<String> {
    const TYPE: ScalarType = ScalarType::StrArray;

    fn into_value(self) -> Value {
        Value::StrArray(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::StrArray(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for Vec<u8> {
    const TYPE: ScalarType = ScalarType::Bytes;

    fn into_value(self) -> Value {
        Value::Bytes(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bytes(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for NaiveDate {
    const TYPE: ScalarType = ScalarType::Date;

    fn into_value(self) -> Value {
        Value::Date(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Date(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

impl Scalar for NaiveDateTime {
    const TYPE: ScalarType = ScalarType::DateTime;

    fn into_value(self) -> Value {
        Value::DateTime(self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::DateTime(v) => Ok(v),
            other => Err(mismatch(&other, Self::TYPE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen_losslessly() {
        assert_eq!(i32::from_value(Value::I16(7)).unwrap(), 7);
        assert_eq!(i64::from_value(Value::I32(7)).unwrap(), 7);
        assert_eq!(Decimal::from_value(Value::I64(7)).unwrap(), Decimal::from(7));
    }

    #[test]
    fn integers_never_narrow() {
        assert!(i16::from_value(Value::I32(7)).is_err());
        assert!(i32::from_value(Value::I64(7)).is_err());
    }

    #[test]
    fn mismatch_message_quotes_the_value() {
        let err = i32::from_value(Value::Str("abc".into())).unwrap_err();
        assert_eq!(err.to_string(), "Can't convert abc to i32.");
    }
}
