// Timestamp message: an instant plus the zone it was observed in

use std::fmt;
use std::ops::Add;

use chrono::{DateTime, Datelike, Offset, SecondsFormat, TimeDelta, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::duration::Duration;
use crate::error::ValidationError;
use crate::zone::{default_zone, Zone};

pub(crate) const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// An absolute instant with the identifier of its originating zone.
///
/// `seconds` and `nanos` are UTC-normalised. `location_name` only affects
/// the zone the instant is displayed in when it is turned back into a
/// `DateTime<Zone>`; two timestamps with different location names can
/// describe the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Timestamp {
    pub seconds: i64,
    /// Sub-second remainder. Values outside `0..1_000_000_000` are carried
    /// into `seconds` on extraction rather than rejected.
    pub nanos: i32,
    pub location_name: String,
}

impl Timestamp {
    /// Column type hint for ORM-style callers.
    pub const SQL_DATA_TYPE: &'static str = "datetime";

    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>, zone: Zone) -> Self {
        Timestamp {
            seconds: instant.timestamp(),
            // leap seconds push this up to 1_999_999_999, still inside i32
            nanos: instant.timestamp_subsec_nanos() as i32,
            location_name: zone.name(),
        }
    }

    /// Build a timestamp in the default zone.
    pub fn new<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::from_instant(instant, default_zone())
    }

    pub fn now() -> Self {
        Self::new(&Utc::now())
    }

    /// Null-propagating construction: no instant, no timestamp.
    pub fn from_instant_opt(instant: Option<&DateTime<Zone>>) -> Option<Self> {
        instant.map(Timestamp::from)
    }

    /// The display zone, falling back to the default zone when
    /// `location_name` does not resolve.
    pub fn zone(&self) -> Zone {
        Zone::resolve(&self.location_name)
    }

    /// Nanoseconds since the Unix epoch.
    pub fn total_nanos(&self) -> i128 {
        self.seconds as i128 * NANOS_PER_SECOND + self.nanos as i128
    }

    /// Reconstruct the instant in its display zone.
    ///
    /// Never fails: seconds beyond chrono's representable range saturate at
    /// its bounds, and an instant whose local time in the display zone
    /// falls outside that range is displayed in UTC instead. Use
    /// `checked_instant` where saturation must be reported.
    pub fn to_instant(&self) -> DateTime<Zone> {
        let utc = match utc_from_total_nanos(self.total_nanos()) {
            Some(utc) => utc,
            None => {
                warn!(
                    seconds = self.seconds,
                    nanos = self.nanos,
                    "timestamp outside representable range, saturating"
                );
                if self.total_nanos() < 0 {
                    DateTime::<Utc>::MIN_UTC
                } else {
                    DateTime::<Utc>::MAX_UTC
                }
            }
        };
        in_display_zone(utc, self.zone())
    }

    pub fn checked_instant(&self) -> Result<DateTime<Zone>, ValidationError> {
        utc_from_total_nanos(self.total_nanos())
            .map(|utc| in_display_zone(utc, self.zone()))
            .ok_or(ValidationError::InvalidTimestamp)
    }

    /// RFC 3339 rendering in the display offset.
    ///
    /// RFC 3339 offsets have whole minutes and four-digit years. When the
    /// display offset has a seconds part (local mean time) or the local year
    /// leaves `0001..=9999`, the instant is written in UTC so that parsing
    /// the text yields the same instant.
    pub fn to_rfc3339(&self) -> String {
        let instant = self.to_instant();
        let exact = instant.offset().fix().local_minus_utc() % 60 == 0
            && (1..=9999).contains(&instant.year());
        if exact {
            instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        } else {
            instant
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::AutoSi, true)
        }
    }

    /// Pointer-style extraction: a missing timestamp has no instant.
    pub fn as_instant(timestamp: Option<&Timestamp>) -> Option<DateTime<Zone>> {
        timestamp.map(Timestamp::to_instant)
    }

    /// Value-style extraction: a missing timestamp is the Unix epoch in UTC.
    pub fn as_instant_value(timestamp: Option<&Timestamp>) -> DateTime<Zone> {
        match timestamp {
            Some(timestamp) => timestamp.to_instant(),
            None => DateTime::<Utc>::default().with_timezone(&Zone::Utc),
        }
    }

    /// Advance by `duration` using instant arithmetic, carrying nanos
    /// across the second boundary. The result is tagged with the resolved
    /// display zone.
    pub fn add_duration(&self, duration: &Duration) -> Timestamp {
        let total = self.total_nanos() + duration.nanoseconds as i128;
        from_total_nanos(total, self.zone())
    }
}

fn utc_from_total_nanos(total: i128) -> Option<DateTime<Utc>> {
    let seconds = i64::try_from(total.div_euclid(NANOS_PER_SECOND)).ok()?;
    let nanos = total.rem_euclid(NANOS_PER_SECOND) as u32;
    DateTime::from_timestamp(seconds, nanos)
}

// The local reading must stay inside chrono's range, or rendering it panics.
fn in_display_zone(utc: DateTime<Utc>, zone: Zone) -> DateTime<Zone> {
    let offset = zone.offset_from_utc_datetime(&utc.naive_utc()).fix();
    let local = utc
        .naive_utc()
        .checked_add_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())));
    if local.is_some() {
        utc.with_timezone(&zone)
    } else {
        warn!(
            zone = %zone,
            instant = %utc,
            "local time outside representable range, displaying in UTC"
        );
        utc.with_timezone(&Zone::Utc)
    }
}

fn from_total_nanos(total: i128, zone: Zone) -> Timestamp {
    let seconds = i64::try_from(total.div_euclid(NANOS_PER_SECOND))
        .unwrap_or(if total < 0 { i64::MIN } else { i64::MAX });
    Timestamp {
        seconds,
        nanos: total.rem_euclid(NANOS_PER_SECOND) as i32,
        location_name: zone.name(),
    }
}

impl From<DateTime<Zone>> for Timestamp {
    fn from(instant: DateTime<Zone>) -> Self {
        Timestamp::from_instant(&instant, instant.timezone())
    }
}

impl From<&DateTime<Zone>> for Timestamp {
    fn from(instant: &DateTime<Zone>) -> Self {
        Timestamp::from_instant(instant, instant.timezone())
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, duration: Duration) -> Timestamp {
        self.add_duration(&duration)
    }
}

impl Add<&Duration> for &Timestamp {
    type Output = Timestamp;

    fn add(self, duration: &Duration) -> Timestamp {
        self.add_duration(duration)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

// Structured text carries the instant only, as an RFC 3339 string in UTC.

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let utc = self.to_instant().with_timezone(&Utc);
        serializer.serialize_str(&utc.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an RFC 3339 timestamp string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Timestamp, E> {
        let instant = DateTime::parse_from_rfc3339(v).map_err(E::custom)?;
        Ok(Timestamp::new(&instant))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(TimestampVisitor)
    }
}
