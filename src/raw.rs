//! Typed extraction of field and cell values.
//!
//! [`extract`] turns the text of an XML field into a [`Value`] according to
//! its XSD type. [`FromXsdValue`] converts a [`Value`] further into a Rust
//! type chosen by the caller.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::protocol::xml::Element;
use crate::value::Value;
use crate::xsd::XsdType;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Read child `field` of `element` and decode it as `xsd`.
///
/// A missing child is NULL, not an error.
pub fn extract(element: &Element, namespace: &str, field: &str, xsd: XsdType) -> Result<Value> {
    match element.find_child(namespace, field) {
        Some(child) => coerce(&child.text(), field, xsd),
        None => Ok(Value::Null),
    }
}

/// Decode `text` as `xsd`. `field` only labels the error.
pub fn coerce(text: &str, field: &str, xsd: XsdType) -> Result<Value> {
    let parsed: std::result::Result<Value, BoxError> = match xsd {
        XsdType::Boolean => parse_boolean(text).map(Value::Boolean),
        XsdType::Byte => number(text).map(Value::Byte),
        XsdType::Short | XsdType::UnsignedByte => number(text).map(Value::Short),
        XsdType::Int | XsdType::UnsignedShort => number(text).map(Value::Int),
        XsdType::Long | XsdType::UnsignedInt => number(text).map(Value::Long),
        XsdType::Integer | XsdType::PositiveInteger => number(text).map(Value::Integer),
        XsdType::Float => number(text).map(Value::Float),
        XsdType::Double => number(text).map(Value::Double),
        XsdType::Decimal | XsdType::UnsignedLong => number(text).map(Value::Decimal),
        XsdType::DateTime => parse_date_time(text).map(Value::DateTime),
        XsdType::String => Ok(Value::String(text.to_string())),
    };
    parsed.map_err(|source| Error::Coercion {
        field: field.to_string(),
        xsd_type: xsd.name(),
        source,
    })
}

fn number<T>(text: &str) -> std::result::Result<T, BoxError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(text.trim().parse::<T>()?)
}

fn parse_boolean(text: &str) -> std::result::Result<bool, BoxError> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Ok(false)
    } else {
        Err(format!("invalid boolean '{text}'").into())
    }
}

/// Lenient ISO-8601 local date-time: `Y-M-D` and `H:M[:S[.fraction]]`
/// separated by a literal `T` (either case). Components need not be
/// zero-padded. No offset is accepted; the result is taken as UTC.
fn parse_date_time(text: &str) -> std::result::Result<DateTime<Utc>, BoxError> {
    let text = text.trim();
    let (date, time) = text
        .split_once(['T', 't'])
        .ok_or_else(|| format!("missing 'T' between date and time in '{text}'"))?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))?;
    Ok(NaiveDateTime::new(date, time).and_utc())
}

/// Conversion from a decoded [`Value`] into a Rust type.
///
/// Each method corresponds to one [`Value`] variant. Implementations return
/// `Err` for unsupported or lossy conversions.
pub trait FromXsdValue: Sized {
    fn from_null() -> Result<Self> {
        Err(mismatch::<Self>("NULL"))
    }

    fn from_bool(_v: bool) -> Result<Self> {
        Err(mismatch::<Self>("BOOLEAN"))
    }

    fn from_i8(_v: i8) -> Result<Self> {
        Err(mismatch::<Self>("TINYINT (i8)"))
    }

    fn from_i16(_v: i16) -> Result<Self> {
        Err(mismatch::<Self>("SMALLINT (i16)"))
    }

    fn from_i32(_v: i32) -> Result<Self> {
        Err(mismatch::<Self>("INTEGER (i32)"))
    }

    fn from_i64(_v: i64) -> Result<Self> {
        Err(mismatch::<Self>("BIGINT (i64)"))
    }

    fn from_big_int(_v: BigInt) -> Result<Self> {
        Err(mismatch::<Self>("INTEGER"))
    }

    fn from_f32(_v: f32) -> Result<Self> {
        Err(mismatch::<Self>("FLOAT (f32)"))
    }

    fn from_f64(_v: f64) -> Result<Self> {
        Err(mismatch::<Self>("DOUBLE (f64)"))
    }

    fn from_decimal(_v: BigDecimal) -> Result<Self> {
        Err(mismatch::<Self>("DECIMAL"))
    }

    fn from_date_time(_v: DateTime<Utc>) -> Result<Self> {
        Err(mismatch::<Self>("DATE"))
    }

    fn from_string(_v: String) -> Result<Self> {
        Err(mismatch::<Self>("VARCHAR"))
    }
}

fn mismatch<T>(kind: &str) -> Error {
    Error::BadUsageError(format!(
        "Cannot decode XMLA value of type {kind} to {}",
        std::any::type_name::<T>()
    ))
}

fn out_of_range<T>(value: impl std::fmt::Display) -> Error {
    Error::BadUsageError(format!(
        "Value {value} is out of range for {}",
        std::any::type_name::<T>()
    ))
}

/// Convert `value` into `T`
pub fn decode<T: FromXsdValue>(value: Value) -> Result<T> {
    match value {
        Value::Null => T::from_null(),
        Value::Boolean(v) => T::from_bool(v),
        Value::Byte(v) => T::from_i8(v),
        Value::Short(v) => T::from_i16(v),
        Value::Int(v) => T::from_i32(v),
        Value::Long(v) => T::from_i64(v),
        Value::Integer(v) => T::from_big_int(v),
        Value::Float(v) => T::from_f32(v),
        Value::Double(v) => T::from_f64(v),
        Value::Decimal(v) => T::from_decimal(v),
        Value::DateTime(v) => T::from_date_time(v),
        Value::String(v) => T::from_string(v),
    }
}

impl FromXsdValue for Value {
    fn from_null() -> Result<Self> {
        Ok(Value::Null)
    }
    fn from_bool(v: bool) -> Result<Self> {
        Ok(Value::Boolean(v))
    }
    fn from_i8(v: i8) -> Result<Self> {
        Ok(Value::Byte(v))
    }
    fn from_i16(v: i16) -> Result<Self> {
        Ok(Value::Short(v))
    }
    fn from_i32(v: i32) -> Result<Self> {
        Ok(Value::Int(v))
    }
    fn from_i64(v: i64) -> Result<Self> {
        Ok(Value::Long(v))
    }
    fn from_big_int(v: BigInt) -> Result<Self> {
        Ok(Value::Integer(v))
    }
    fn from_f32(v: f32) -> Result<Self> {
        Ok(Value::Float(v))
    }
    fn from_f64(v: f64) -> Result<Self> {
        Ok(Value::Double(v))
    }
    fn from_decimal(v: BigDecimal) -> Result<Self> {
        Ok(Value::Decimal(v))
    }
    fn from_date_time(v: DateTime<Utc>) -> Result<Self> {
        Ok(Value::DateTime(v))
    }
    fn from_string(v: String) -> Result<Self> {
        Ok(Value::String(v))
    }
}

impl<T: FromXsdValue> FromXsdValue for Option<T> {
    fn from_null() -> Result<Self> {
        Ok(None)
    }
    fn from_bool(v: bool) -> Result<Self> {
        T::from_bool(v).map(Some)
    }
    fn from_i8(v: i8) -> Result<Self> {
        T::from_i8(v).map(Some)
    }
    fn from_i16(v: i16) -> Result<Self> {
        T::from_i16(v).map(Some)
    }
    fn from_i32(v: i32) -> Result<Self> {
        T::from_i32(v).map(Some)
    }
    fn from_i64(v: i64) -> Result<Self> {
        T::from_i64(v).map(Some)
    }
    fn from_big_int(v: BigInt) -> Result<Self> {
        T::from_big_int(v).map(Some)
    }
    fn from_f32(v: f32) -> Result<Self> {
        T::from_f32(v).map(Some)
    }
    fn from_f64(v: f64) -> Result<Self> {
        T::from_f64(v).map(Some)
    }
    fn from_decimal(v: BigDecimal) -> Result<Self> {
        T::from_decimal(v).map(Some)
    }
    fn from_date_time(v: DateTime<Utc>) -> Result<Self> {
        T::from_date_time(v).map(Some)
    }
    fn from_string(v: String) -> Result<Self> {
        T::from_string(v).map(Some)
    }
}

impl FromXsdValue for bool {
    fn from_bool(v: bool) -> Result<Self> {
        Ok(v)
    }
}

/// Integers accept every integer variant that fits, and whole decimals
macro_rules! impl_from_xsd_integer {
    ($($t:ty => $to:ident),* $(,)?) => {
        $(
            impl FromXsdValue for $t {
                fn from_i8(v: i8) -> Result<Self> {
                    <$t>::try_from(v).map_err(|_| out_of_range::<$t>(v))
                }
                fn from_i16(v: i16) -> Result<Self> {
                    <$t>::try_from(v).map_err(|_| out_of_range::<$t>(v))
                }
                fn from_i32(v: i32) -> Result<Self> {
                    <$t>::try_from(v).map_err(|_| out_of_range::<$t>(v))
                }
                fn from_i64(v: i64) -> Result<Self> {
                    <$t>::try_from(v).map_err(|_| out_of_range::<$t>(v))
                }
                fn from_big_int(v: BigInt) -> Result<Self> {
                    <$t>::try_from(&v).map_err(|_| out_of_range::<$t>(&v))
                }
                fn from_decimal(v: BigDecimal) -> Result<Self> {
                    if !is_whole(&v) {
                        return Err(out_of_range::<$t>(&v));
                    }
                    v.$to().ok_or_else(|| out_of_range::<$t>(&v))
                }
            }
        )*
    };
}

impl_from_xsd_integer!(
    i8 => to_i8,
    i16 => to_i16,
    i32 => to_i32,
    i64 => to_i64,
    i128 => to_i128,
    u8 => to_u8,
    u16 => to_u16,
    u32 => to_u32,
    u64 => to_u64,
);

impl FromXsdValue for f32 {
    fn from_f32(v: f32) -> Result<Self> {
        Ok(v)
    }
}

impl FromXsdValue for f64 {
    fn from_f32(v: f32) -> Result<Self> {
        Ok(f64::from(v))
    }
    fn from_f64(v: f64) -> Result<Self> {
        Ok(v)
    }
    fn from_i8(v: i8) -> Result<Self> {
        Ok(f64::from(v))
    }
    fn from_i16(v: i16) -> Result<Self> {
        Ok(f64::from(v))
    }
    fn from_i32(v: i32) -> Result<Self> {
        Ok(f64::from(v))
    }
    fn from_big_int(v: BigInt) -> Result<Self> {
        v.to_f64().ok_or_else(|| out_of_range::<f64>(&v))
    }
    fn from_decimal(v: BigDecimal) -> Result<Self> {
        v.to_f64().ok_or_else(|| out_of_range::<f64>(&v))
    }
}

impl FromXsdValue for BigDecimal {
    fn from_i8(v: i8) -> Result<Self> {
        Ok(BigDecimal::from(v))
    }
    fn from_i16(v: i16) -> Result<Self> {
        Ok(BigDecimal::from(v))
    }
    fn from_i32(v: i32) -> Result<Self> {
        Ok(BigDecimal::from(v))
    }
    fn from_i64(v: i64) -> Result<Self> {
        Ok(BigDecimal::from(v))
    }
    fn from_big_int(v: BigInt) -> Result<Self> {
        Ok(BigDecimal::new(v, 0))
    }
    fn from_decimal(v: BigDecimal) -> Result<Self> {
        Ok(v)
    }
}

impl FromXsdValue for BigInt {
    fn from_i8(v: i8) -> Result<Self> {
        Ok(BigInt::from(v))
    }
    fn from_i16(v: i16) -> Result<Self> {
        Ok(BigInt::from(v))
    }
    fn from_i32(v: i32) -> Result<Self> {
        Ok(BigInt::from(v))
    }
    fn from_i64(v: i64) -> Result<Self> {
        Ok(BigInt::from(v))
    }
    fn from_big_int(v: BigInt) -> Result<Self> {
        Ok(v)
    }
    fn from_decimal(v: BigDecimal) -> Result<Self> {
        if !is_whole(&v) {
            return Err(out_of_range::<BigInt>(&v));
        }
        Ok(v.with_scale(0).into_bigint_and_exponent().0)
    }
}

/// Fixed 96-bit decimal. Values that need more digits are out of range
/// rather than rounded.
#[cfg(feature = "with-rust-decimal")]
impl FromXsdValue for rust_decimal::Decimal {
    fn from_i8(v: i8) -> Result<Self> {
        Ok(Self::from(v))
    }
    fn from_i16(v: i16) -> Result<Self> {
        Ok(Self::from(v))
    }
    fn from_i32(v: i32) -> Result<Self> {
        Ok(Self::from(v))
    }
    fn from_i64(v: i64) -> Result<Self> {
        Ok(Self::from(v))
    }
    fn from_big_int(v: BigInt) -> Result<Self> {
        i128::try_from(&v)
            .ok()
            .and_then(|i| Self::try_from_i128_with_scale(i, 0).ok())
            .ok_or_else(|| out_of_range::<Self>(&v))
    }
    fn from_decimal(v: BigDecimal) -> Result<Self> {
        Self::from_str_exact(&v.to_plain_string()).map_err(|_| out_of_range::<Self>(&v))
    }
}

fn is_whole(v: &BigDecimal) -> bool {
    v.with_scale(0) == *v
}

impl FromXsdValue for DateTime<Utc> {
    fn from_date_time(v: DateTime<Utc>) -> Result<Self> {
        Ok(v)
    }
}

/// Every non-NULL value has a text form
impl FromXsdValue for String {
    fn from_bool(v: bool) -> Result<Self> {
        Ok(v.to_string())
    }
    fn from_i8(v: i8) -> Result<Self> {
        Ok(v.to_string())
    }
    fn from_i16(v: i16) -> Result<Self> {
        Ok(v.to_string())
    }
    fn from_i32(v: i32) -> Result<Self> {
        Ok(v.to_string())
    }
    fn from_i64(v: i64) -> Result<Self> {
        Ok(v.to_string())
    }
    fn from_big_int(v: BigInt) -> Result<Self> {
        Ok(v.to_string())
    }
    fn from_f32(v: f32) -> Result<Self> {
        Ok(Value::Float(v).to_string())
    }
    fn from_f64(v: f64) -> Result<Self> {
        Ok(Value::Double(v).to_string())
    }
    fn from_decimal(v: BigDecimal) -> Result<Self> {
        Ok(v.to_plain_string())
    }
    fn from_date_time(v: DateTime<Utc>) -> Result<Self> {
        Ok(Value::DateTime(v).to_string())
    }
    fn from_string(v: String) -> Result<Self> {
        Ok(v)
    }
}
