//! Loosely-typed bind values.
//!
//! [`SqlValue`] is the value type carried by update payloads and compiled
//! predicates. It binds according to the parameter type Postgres reports for
//! the placeholder, so a payload built from JSON (`32`, `"0.5"`, `null`) can be
//! sent to `INTEGER`/`NUMERIC`/`TEXT` columns without the caller picking a
//! Rust type per column.

use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A single bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL` (explicitly clears a column in an update).
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
}

impl SqlValue {
    /// Short type label used in bind error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Numeric(_) => "numeric",
            Self::Text(_) => "text",
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        Self::Numeric(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

type BindError = Box<dyn Error + Sync + Send>;

fn parse_text<T>(s: &str, ty: &Type) -> Result<T, BindError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    s.trim()
        .parse::<T>()
        .map_err(|e| format!("cannot bind {s:?} as {ty}: {e}").into())
}

fn mismatch(value: &SqlValue, ty: &Type) -> BindError {
    format!("cannot bind {} value {value} as {ty}", value.kind()).into()
}

fn is_integer(ty: &Type) -> bool {
    matches!(*ty, Type::INT2 | Type::INT4 | Type::INT8)
}

fn is_text(ty: &Type) -> bool {
    matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN)
}

// `ty` must satisfy `is_integer`.
fn bind_integer(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BindError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

/// `v` as an `i64` when it is a whole number in range.
fn integral(v: f64) -> Option<i64> {
    // 2^63 is exact as f64; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (v.fract() == 0.0 && (-LIMIT..LIMIT).contains(&v)).then_some(v as i64)
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BindError> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            SqlValue::Int(v) => match *ty {
                _ if is_integer(ty) => bind_integer(*v, ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            SqlValue::Float(v) => match *ty {
                _ if is_integer(ty) => match integral(*v) {
                    Some(n) => bind_integer(n, ty, out),
                    None => Err(mismatch(self, ty)),
                },
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => v.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*v)?.to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            SqlValue::Numeric(v) => match *ty {
                Type::NUMERIC => v.to_sql(ty, out),
                _ if is_integer(ty) => match v.fract().is_zero().then(|| v.to_i64()).flatten() {
                    Some(n) => bind_integer(n, ty, out),
                    None => Err(mismatch(self, ty)),
                },
                Type::FLOAT4 | Type::FLOAT8 => match v.to_f64() {
                    Some(f) if *ty == Type::FLOAT4 => (f as f32).to_sql(ty, out),
                    Some(f) => f.to_sql(ty, out),
                    None => Err(mismatch(self, ty)),
                },
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            SqlValue::Text(v) => match *ty {
                Type::INT2 => parse_text::<i16>(v, ty)?.to_sql(ty, out),
                Type::INT4 => parse_text::<i32>(v, ty)?.to_sql(ty, out),
                Type::INT8 => parse_text::<i64>(v, ty)?.to_sql(ty, out),
                Type::FLOAT4 => parse_text::<f32>(v, ty)?.to_sql(ty, out),
                Type::FLOAT8 => parse_text::<f64>(v, ty)?.to_sql(ty, out),
                Type::NUMERIC => parse_text::<Decimal>(v, ty)?.to_sql(ty, out),
                Type::BOOL => parse_text::<bool>(v, ty)?.to_sql(ty, out),
                _ if is_text(ty) => v.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

struct SqlValueVisitor;

impl<'de> Visitor<'de> for SqlValueVisitor {
    type Value = SqlValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<SqlValue, E> {
        Ok(SqlValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<SqlValue, E> {
        Ok(SqlValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<SqlValue, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<SqlValue, E> {
        Ok(SqlValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SqlValue, E> {
        Ok(SqlValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SqlValue, E> {
        i64::try_from(v)
            .map(SqlValue::Int)
            .map_err(|_| E::custom(format!("integer {v} out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<SqlValue, E> {
        Ok(SqlValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SqlValue, E> {
        Ok(SqlValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<SqlValue, E> {
        Ok(SqlValue::Text(v))
    }
}

impl<'de> Deserialize<'de> for SqlValue {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(SqlValueVisitor)
    }
}
