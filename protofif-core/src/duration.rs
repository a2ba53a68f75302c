// Duration message: a signed nanosecond count

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Elapsed time in nanoseconds.
///
/// Carried as a bare integer in every format, so round trips are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration {
    pub nanoseconds: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { nanoseconds: 0 };

    pub const fn from_nanos(nanoseconds: i64) -> Self {
        Duration { nanoseconds }
    }

    pub const fn as_nanos(&self) -> i64 {
        self.nanoseconds
    }

    pub fn to_time_delta(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.nanoseconds)
    }

    /// Pointer-style extraction: a missing duration has no delta.
    pub fn as_time_delta(duration: Option<&Duration>) -> Option<TimeDelta> {
        duration.map(Duration::to_time_delta)
    }

    /// Value-style extraction: a missing duration is zero.
    pub fn as_time_delta_value(duration: Option<&Duration>) -> TimeDelta {
        duration.map_or_else(TimeDelta::zero, Duration::to_time_delta)
    }
}

impl From<Duration> for TimeDelta {
    fn from(duration: Duration) -> Self {
        duration.to_time_delta()
    }
}

impl TryFrom<TimeDelta> for Duration {
    type Error = ValidationError;

    fn try_from(delta: TimeDelta) -> Result<Self, Self::Error> {
        delta
            .num_nanoseconds()
            .map(Duration::from_nanos)
            .ok_or(ValidationError::InvalidDuration)
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = ValidationError;

    fn try_from(duration: std::time::Duration) -> Result<Self, Self::Error> {
        i64::try_from(duration.as_nanos())
            .map(Duration::from_nanos)
            .map_err(|_| ValidationError::InvalidDuration)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.nanoseconds)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Duration::from_nanos)
    }
}

/// Serde helper for `Option<Duration>` fields that writes a missing
/// duration as an empty string instead of `null`.
///
/// Decoding does not accept the empty string back; it takes an integer or
/// `null`. Documents written with a missing duration therefore fail to
/// decode, matching the format this was built to interoperate with.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Job {
///     #[serde(with = "protofif_core::duration::empty_when_null")]
///     timeout: Option<Duration>,
/// }
/// ```
pub mod empty_when_null {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => duration.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<Duration>::deserialize(deserializer)
    }
}
