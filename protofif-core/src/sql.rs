// Relational-driver boundary
//
// `DriverValue` is the closed set of values a database driver hands to, and
// accepts from, column bindings. `Valuer` produces one for a parameter,
// `Scanner` consumes one from a result column.

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::ScanError;
use crate::timestamp::Timestamp;
use crate::zone::Zone;

const SQL_LITERAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";
const SQL_LITERAL_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// A driver-native column value
#[derive(Debug, Clone, PartialEq)]
pub enum DriverValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Bytes(Vec<u8>),
    Text(String),
    Time(DateTime<Zone>),
}

impl DriverValue {
    /// Name of the host type, used in scan errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            DriverValue::Null => "null",
            DriverValue::Bool(_) => "bool",
            DriverValue::Int64(_) => "int64",
            DriverValue::Float64(_) => "float64",
            DriverValue::Bytes(_) => "bytes",
            DriverValue::Text(_) => "string",
            DriverValue::Time(_) => "time",
        }
    }
}

impl From<DateTime<Zone>> for DriverValue {
    fn from(instant: DateTime<Zone>) -> Self {
        DriverValue::Time(instant)
    }
}

impl From<DateTime<Utc>> for DriverValue {
    fn from(instant: DateTime<Utc>) -> Self {
        DriverValue::Time(instant.with_timezone(&Zone::Utc))
    }
}

impl From<DateTime<FixedOffset>> for DriverValue {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        DriverValue::Time(instant.with_timezone(&Zone::from_offset(*instant.offset())))
    }
}

impl From<bool> for DriverValue {
    fn from(b: bool) -> Self {
        DriverValue::Bool(b)
    }
}

impl From<i64> for DriverValue {
    fn from(n: i64) -> Self {
        DriverValue::Int64(n)
    }
}

impl From<f64> for DriverValue {
    fn from(f: f64) -> Self {
        DriverValue::Float64(f)
    }
}

impl From<Vec<u8>> for DriverValue {
    fn from(bytes: Vec<u8>) -> Self {
        DriverValue::Bytes(bytes)
    }
}

impl From<String> for DriverValue {
    fn from(s: String) -> Self {
        DriverValue::Text(s)
    }
}

impl From<&str> for DriverValue {
    fn from(s: &str) -> Self {
        DriverValue::Text(s.to_string())
    }
}

/// Produces the value bound for a query parameter
pub trait Valuer {
    fn driver_value(&self) -> DriverValue;
}

/// Consumes the value read from a result column
pub trait Scanner {
    fn scan(&mut self, src: DriverValue) -> Result<(), ScanError>;
}

impl<T: Valuer> Valuer for Option<T> {
    fn driver_value(&self) -> DriverValue {
        match self {
            Some(value) => value.driver_value(),
            None => DriverValue::Null,
        }
    }
}

impl<T: Scanner + Default> Scanner for Option<T> {
    fn scan(&mut self, src: DriverValue) -> Result<(), ScanError> {
        if src == DriverValue::Null {
            *self = None;
            return Ok(());
        }
        let mut value = T::default();
        value.scan(src)?;
        *self = Some(value);
        Ok(())
    }
}

impl Valuer for Timestamp {
    fn driver_value(&self) -> DriverValue {
        DriverValue::Time(self.to_instant())
    }
}

impl Scanner for Timestamp {
    /// Accepts a native instant or an RFC 3339 string.
    ///
    /// A null column is an absent instant: it leaves the receiver unchanged
    /// instead of failing with a type mismatch. Callers that must tell a
    /// null column apart scan into `Option<Timestamp>`, which becomes `None`.
    fn scan(&mut self, src: DriverValue) -> Result<(), ScanError> {
        match src {
            DriverValue::Time(instant) => *self = Timestamp::from(instant),
            DriverValue::Text(text) => *self = parse_rfc3339(&text)?,
            DriverValue::Null => {}
            other => {
                return Err(ScanError::TypeMismatch {
                    type_name: other.type_name(),
                })
            }
        }
        Ok(())
    }
}

/// Parse an RFC 3339 string, keeping its offset as the display zone.
pub fn parse_rfc3339(text: &str) -> Result<Timestamp, ScanError> {
    let instant =
        DateTime::parse_from_rfc3339(text).map_err(|source| ScanError::InvalidTimestamp {
            input: text.to_string(),
            source,
        })?;
    Ok(with_offset_zone(&instant))
}

/// Append a timestamp as a SQL literal in UTC, or `NULL` when absent.
pub fn append_sql_literal(buf: &mut String, timestamp: Option<&Timestamp>, quote: bool) {
    let Some(timestamp) = timestamp else {
        buf.push_str("NULL");
        return;
    };
    let utc = timestamp.to_instant().with_timezone(&Utc);
    if quote {
        buf.push('\'');
    }
    buf.push_str(&utc.format(SQL_LITERAL_FORMAT).to_string());
    if quote {
        buf.push('\'');
    }
}

/// Parse a timestamp literal as written by `append_sql_literal` or by a
/// database's text output (`2024-01-15 10:00:00+00`). RFC 3339 is accepted
/// as well.
pub fn parse_sql_literal(literal: &str) -> Result<Timestamp, ScanError> {
    let text = literal
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(literal);

    match DateTime::parse_from_str(text, SQL_LITERAL_PARSE_FORMAT) {
        Ok(instant) => Ok(with_offset_zone(&instant)),
        Err(source) => match parse_rfc3339(text) {
            Ok(timestamp) => Ok(timestamp),
            Err(_) => Err(ScanError::InvalidTimestamp {
                input: literal.to_string(),
                source,
            }),
        },
    }
}

/// RFC 3339 rendering used for text columns; see `Timestamp::to_rfc3339`.
pub fn to_rfc3339(timestamp: &Timestamp) -> String {
    timestamp.to_rfc3339()
}

fn with_offset_zone(instant: &DateTime<FixedOffset>) -> Timestamp {
    Timestamp::from_instant(instant, Zone::from_offset(*instant.offset()))
}
