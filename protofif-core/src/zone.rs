// Zone resolution shared by the temporal codecs
//
// A `Timestamp` carries the identifier of the zone it was created in. The
// instant itself is always UTC-normalised; the zone only decides how the
// instant is displayed once it is turned back into a `DateTime<Zone>`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::ZoneError;

static DEFAULT_ZONE: OnceLock<Zone> = OnceLock::new();

/// A display zone resolvable from a `Timestamp` location name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Utc,
    /// A zone from the IANA database, e.g. `Europe/Berlin`.
    Named(Tz),
    /// A fixed offset, named `+HH:MM`.
    Fixed(FixedOffset),
}

/// The offset of a `Zone` at a particular instant.
///
/// Remembers the zone it came from so that `DateTime<Zone>` keeps its zone
/// identity through chrono's arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneOffset {
    zone: Zone,
    fixed: FixedOffset,
}

impl Zone {
    /// Canonical identifier stored in `Timestamp::location_name`.
    pub fn name(&self) -> String {
        match self {
            Zone::Utc => "UTC".to_string(),
            Zone::Named(tz) => tz.name().to_string(),
            Zone::Fixed(offset) => offset.to_string(),
        }
    }

    /// Strict lookup of a location name.
    pub fn lookup(name: &str) -> Result<Zone, ZoneError> {
        match name {
            "" | "UTC" | "Z" => return Ok(Zone::Utc),
            "Local" => return Ok(default_zone()),
            _ => {}
        }

        if name.starts_with('+') || name.starts_with('-') {
            return FixedOffset::from_str(name)
                .map(Zone::Fixed)
                .map_err(|_| ZoneError::Unknown(name.to_string()));
        }

        name.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| ZoneError::Unknown(name.to_string()))
    }

    /// Lenient lookup: an unresolvable name falls back to the default zone.
    ///
    /// The fallback only changes the display zone, never the instant.
    pub fn resolve(name: &str) -> Zone {
        match Zone::lookup(name) {
            Ok(zone) => zone,
            Err(_) => {
                let fallback = default_zone();
                debug!(
                    location = name,
                    fallback = %fallback,
                    "unresolvable location, using default zone"
                );
                fallback
            }
        }
    }

    /// Zone for a bare offset; a zero offset is UTC.
    pub fn from_offset(offset: FixedOffset) -> Zone {
        if offset.local_minus_utc() == 0 {
            Zone::Utc
        } else {
            Zone::Fixed(offset)
        }
    }

    fn offset_at(&self, utc: &NaiveDateTime) -> ZoneOffset {
        let fixed = match self {
            Zone::Utc => utc_offset(),
            Zone::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
            Zone::Fixed(offset) => *offset,
        };
        ZoneOffset { zone: *self, fixed }
    }

    fn local_offset(&self, local: &NaiveDateTime) -> LocalResult<ZoneOffset> {
        let zone = *self;
        match self {
            Zone::Utc => LocalResult::Single(ZoneOffset {
                zone,
                fixed: utc_offset(),
            }),
            Zone::Named(tz) => tz
                .offset_from_local_datetime(local)
                .map(|offset| ZoneOffset {
                    zone,
                    fixed: offset.fix(),
                }),
            Zone::Fixed(offset) => LocalResult::Single(ZoneOffset {
                zone,
                fixed: *offset,
            }),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Zone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::lookup(s)
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Named(tz)
    }
}

impl ZoneOffset {
    pub fn zone(&self) -> Zone {
        self.zone
    }
}

impl Offset for ZoneOffset {
    fn fix(&self) -> FixedOffset {
        self.fixed
    }
}

impl fmt::Display for ZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fixed, f)
    }
}

impl TimeZone for Zone {
    type Offset = ZoneOffset;

    fn from_offset(offset: &ZoneOffset) -> Self {
        offset.zone
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<ZoneOffset> {
        self.local_offset(&local.and_time(chrono::NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<ZoneOffset> {
        self.local_offset(local)
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> ZoneOffset {
        self.offset_at(&utc.and_time(chrono::NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> ZoneOffset {
        self.offset_at(utc)
    }
}

#[inline]
fn utc_offset() -> FixedOffset {
    chrono::Utc.fix()
}

/// The zone used when no zone is given or a location fails to resolve.
///
/// Pinned to UTC unless `install_default_zone` ran first, so results do not
/// depend on the host's local time setting.
pub fn default_zone() -> Zone {
    *DEFAULT_ZONE.get_or_init(|| Zone::Utc)
}

/// Install the process-wide default zone. Can only happen once, and only
/// before the default zone was first read.
pub fn install_default_zone(zone: Zone) -> Result<(), ZoneError> {
    DEFAULT_ZONE
        .set(zone)
        .map_err(|_| ZoneError::AlreadyInstalled(default_zone().name()))
}
