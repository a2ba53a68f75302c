// Document-database (BSON) boundary
//
// Timestamps travel as the native BSON datetime, which only has millisecond
// precision; anything finer is truncated by the format. Durations travel as
// 64-bit integers and round-trip exactly.

use bson::spec::ElementType;
use bson::Bson;
use chrono::{DateTime, Utc};

use crate::duration::Duration;
use crate::error::BsonError;
use crate::timestamp::{Timestamp, NANOS_PER_SECOND};

const NANOS_PER_MILLI: i128 = NANOS_PER_SECOND / 1_000;

/// Conversion to and from a single BSON value.
pub trait BsonCodec: Sized {
    fn to_bson(&self) -> Bson;

    fn from_bson(value: &Bson) -> Result<Self, BsonError>;

    /// Decode the raw payload of one BSON element of the declared type.
    ///
    /// An empty payload leaves `self` untouched.
    fn unmarshal_bson_payload(
        &mut self,
        element_type: ElementType,
        payload: &[u8],
    ) -> Result<(), BsonError> {
        if payload.is_empty() {
            return Ok(());
        }
        *self = Self::from_bson(&read_payload(element_type, payload)?)?;
        Ok(())
    }
}

/// A missing value is the BSON null discriminator.
impl<T: BsonCodec> BsonCodec for Option<T> {
    fn to_bson(&self) -> Bson {
        match self {
            Some(value) => value.to_bson(),
            None => Bson::Null,
        }
    }

    fn from_bson(value: &Bson) -> Result<Self, BsonError> {
        match value {
            Bson::Null => Ok(None),
            other => T::from_bson(other).map(Some),
        }
    }
}

impl BsonCodec for Timestamp {
    fn to_bson(&self) -> Bson {
        let millis = self.to_instant().timestamp_millis();
        Bson::DateTime(bson::DateTime::from_millis(millis))
    }

    fn from_bson(value: &Bson) -> Result<Self, BsonError> {
        match value {
            Bson::DateTime(datetime) => {
                let millis = datetime.timestamp_millis();
                let instant = DateTime::<Utc>::from_timestamp_millis(millis)
                    .ok_or(BsonError::DateTimeOutOfRange(millis))?;
                Ok(Timestamp::new(&instant))
            }
            other => Err(BsonError::UnexpectedType {
                expected: "datetime",
                actual: other.element_type(),
            }),
        }
    }
}

impl BsonCodec for Duration {
    fn to_bson(&self) -> Bson {
        Bson::Int64(self.nanoseconds)
    }

    fn from_bson(value: &Bson) -> Result<Self, BsonError> {
        match value {
            Bson::Int64(n) => Ok(Duration::from_nanos(*n)),
            Bson::Int32(n) => Ok(Duration::from_nanos(i64::from(*n))),
            Bson::Double(f) => integral_double(*f).map(Duration::from_nanos),
            other => Err(BsonError::UnexpectedType {
                expected: "integer",
                actual: other.element_type(),
            }),
        }
    }
}

/// Encode an optional value, writing the null discriminator when absent.
pub fn encode_bson<T: BsonCodec>(value: Option<&T>) -> Bson {
    value.map_or(Bson::Null, BsonCodec::to_bson)
}

/// Milliseconds since the epoch for a timestamp, floored.
pub fn timestamp_millis(timestamp: &Timestamp) -> i128 {
    timestamp.total_nanos().div_euclid(NANOS_PER_MILLI)
}

fn integral_double(f: f64) -> Result<i64, BsonError> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(BsonError::NonIntegral(f))
    }
}

// Element payloads are little-endian, without the type byte or key.
fn read_payload(element_type: ElementType, payload: &[u8]) -> Result<Bson, BsonError> {
    let malformed = || BsonError::Payload {
        element_type,
        len: payload.len(),
    };
    match element_type {
        ElementType::DateTime => {
            let bytes: [u8; 8] = payload.try_into().map_err(|_| malformed())?;
            Ok(Bson::DateTime(bson::DateTime::from_millis(i64::from_le_bytes(bytes))))
        }
        ElementType::Int64 => {
            let bytes: [u8; 8] = payload.try_into().map_err(|_| malformed())?;
            Ok(Bson::Int64(i64::from_le_bytes(bytes)))
        }
        ElementType::Int32 => {
            let bytes: [u8; 4] = payload.try_into().map_err(|_| malformed())?;
            Ok(Bson::Int32(i32::from_le_bytes(bytes)))
        }
        ElementType::Double => {
            let bytes: [u8; 8] = payload.try_into().map_err(|_| malformed())?;
            Ok(Bson::Double(f64::from_le_bytes(bytes)))
        }
        other => Err(BsonError::UnexpectedType {
            expected: "datetime or numeric element",
            actual: other,
        }),
    }
}
