//! Native values decoded from XSD-typed text

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;

use crate::xsd::XsdType;

/// A decoded cell or field value
///
/// Unsigned schema types are widened to the next larger signed variant so
/// that their full range fits.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent field or cell
    Null,
    /// xsd:boolean
    Boolean(bool),
    /// xsd:byte
    Byte(i8),
    /// xsd:short, xsd:unsignedByte
    Short(i16),
    /// xsd:int, xsd:unsignedShort
    Int(i32),
    /// xsd:long, xsd:unsignedInt
    Long(i64),
    /// xsd:integer, xsd:positiveInteger
    Integer(BigInt),
    /// xsd:float
    Float(f32),
    /// xsd:double
    Double(f64),
    /// xsd:decimal, xsd:unsignedLong
    Decimal(BigDecimal),
    /// xsd:dateTime, interpreted as UTC
    DateTime(DateTime<Utc>),
    /// xsd:string and every unrecognized type
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The schema type a value of this variant is written as.
    ///
    /// Widened variants report their signed schema type, e.g. a value read
    /// from `xsd:unsignedByte` reports `xsd:short`.
    pub fn xsd_type(&self) -> XsdType {
        match self {
            Value::Null | Value::String(_) => XsdType::String,
            Value::Boolean(_) => XsdType::Boolean,
            Value::Byte(_) => XsdType::Byte,
            Value::Short(_) => XsdType::Short,
            Value::Int(_) => XsdType::Int,
            Value::Long(_) => XsdType::Long,
            Value::Integer(_) => XsdType::Integer,
            Value::Float(_) => XsdType::Float,
            Value::Double(_) => XsdType::Double,
            Value::Decimal(_) => XsdType::Decimal,
            Value::DateTime(_) => XsdType::DateTime,
        }
    }

    /// Text representation accepted back by the extractor, `None` for NULL
    pub fn to_xsd_text(&self) -> Option<String> {
        let text = match self {
            Value::Null => return None,
            Value::Boolean(v) => v.to_string(),
            Value::Byte(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => float_text(f64::from(*v), v.to_string()),
            Value::Double(v) => float_text(*v, v.to_string()),
            Value::Decimal(v) => v.to_plain_string(),
            Value::DateTime(v) => v.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Value::String(v) => v.clone(),
        };
        Some(text)
    }
}

/// XSD spells the special floating point values INF, -INF and NaN
fn float_text(v: f64, finite: String) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() && v.is_sign_positive() {
        "INF".to_string()
    } else if v.is_infinite() {
        "-INF".to_string()
    } else {
        finite
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_xsd_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("NULL"),
        }
    }
}
