//! Lenient wire adapters for the PHP API
//!
//! The remote endpoints return MySQL rows mostly as strings: ids and prices
//! arrive as `"12"` / `"1500.00"`, flags as `0|1`, and unset dates as `""` or
//! `"0000-00-00"`. Use these modules with `#[serde(with = "...")]`.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serializer};
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Any scalar the API may use for a number, id or flag
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn parse_decimal<E: DeError>(raw: Scalar) -> Result<Option<Decimal>, E> {
    match raw {
        Scalar::Int(v) => Ok(Some(Decimal::from(v))),
        Scalar::Float(v) => Decimal::from_f64(v)
            .map(Some)
            .ok_or_else(|| E::custom(format!("amount out of range: {v}"))),
        Scalar::Text(s) => {
            let s = s.trim().replace(',', "");
            if s.is_empty() {
                return Ok(None);
            }
            Decimal::from_str(&s)
                .map(Some)
                .map_err(|_| E::custom(format!("invalid amount: {s}")))
        }
        Scalar::Bool(_) => Err(E::custom("expected an amount, found a boolean")),
    }
}

fn parse_id<E: DeError>(raw: Scalar) -> Result<Option<i64>, E> {
    match raw {
        Scalar::Int(v) => Ok(Some(v)),
        Scalar::Float(v) if v.fract() == 0.0 => Ok(Some(v as i64)),
        Scalar::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("null") {
                return Ok(None);
            }
            s.parse::<i64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid id: {s}")))
        }
        other => Err(E::custom(format!("invalid id: {other:?}"))),
    }
}

/// Parse an API date, accepting a bare date or a MySQL datetime.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() || s.starts_with("0000-00-00") {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok()))
}

/// Required id (`12` or `"12"`)
pub mod id {
    use super::*;

    pub fn serialize<S: Serializer>(value: &i64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        parse_id(Scalar::deserialize(d)?)?.ok_or_else(|| D::Error::custom("missing id"))
    }
}

/// Nullable id (`null`, `""`, `12`, `"12"`)
pub mod opt_id {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<i64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_i64(*v),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        match Option::<Scalar>::deserialize(d)? {
            Some(raw) => parse_id(raw),
            None => Ok(None),
        }
    }
}

/// Amount, `""` reads as zero; written as a JSON number
pub mod money {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Decimal, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(value.to_f64().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        match Option::<Scalar>::deserialize(d)? {
            Some(raw) => Ok(parse_decimal(raw)?.unwrap_or_default()),
            None => Ok(Decimal::ZERO),
        }
    }
}

/// Nullable amount
pub mod opt_money {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_f64(v.to_f64().unwrap_or_default()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
        match Option::<Scalar>::deserialize(d)? {
            Some(raw) => parse_decimal(raw),
            None => Ok(None),
        }
    }
}

/// Boolean flag (`true`, `1`, `"1"`, `"true"`, `"yes"`)
pub mod flag {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Option::<Scalar>::deserialize(d)? {
            Some(Scalar::Bool(b)) => b,
            Some(Scalar::Int(v)) => v != 0,
            Some(Scalar::Float(v)) => v != 0.0,
            Some(Scalar::Text(s)) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            None => false,
        })
    }
}

/// Flag that may be absent (`null` reads as `None`)
pub mod opt_flag {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<bool>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_bool(*v),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Option::<Scalar>::deserialize(d)? {
            Some(Scalar::Bool(b)) => Some(b),
            Some(Scalar::Int(v)) => Some(v != 0),
            Some(Scalar::Float(v)) => Some(v != 0.0),
            Some(Scalar::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" => None,
                "1" | "true" | "yes" | "on" => Some(true),
                _ => Some(false),
            },
            None => None,
        })
    }
}

/// Free text that may arrive as a number; empty reads as `None`
pub mod opt_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(v),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Scalar>::deserialize(d)? {
            Some(Scalar::Text(s)) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            Some(Scalar::Int(v)) => Some(v.to_string()),
            Some(Scalar::Float(v)) => Some(v.to_string()),
            Some(Scalar::Bool(b)) => Some(b.to_string()),
            None => None,
        })
    }
}

/// Required date
pub mod date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
    }
}

/// Nullable date (`null`, `""`, `"0000-00-00"` read as `None`)
pub mod opt_date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&v.format(DATE_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.and_then(|raw| parse_date(&raw)))
    }
}
