// SQLite bindings via rusqlite
//
// SQLite has no native datetime storage class, so timestamps are stored as
// RFC 3339 text in their display offset, or in UTC where the offset has a
// seconds part that RFC 3339 cannot carry. Durations are plain INTEGER
// columns.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::duration::Duration;
use crate::error::ScanError;
use crate::sql::{to_rfc3339, DriverValue, Scanner};
use crate::timestamp::Timestamp;

/// Lift a SQLite column value into the driver value set.
pub fn driver_value(value: ValueRef<'_>) -> FromSqlResult<DriverValue> {
    Ok(match value {
        ValueRef::Null => DriverValue::Null,
        ValueRef::Integer(n) => DriverValue::Int64(n),
        ValueRef::Real(f) => DriverValue::Float64(f),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| FromSqlError::Other(Box::new(e)))?;
            DriverValue::Text(text.to_string())
        }
        ValueRef::Blob(bytes) => DriverValue::Bytes(bytes.to_vec()),
    })
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(to_rfc3339(self)))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        // NULL columns are read through Option<Timestamp>
        if let ValueRef::Null = value {
            return Err(FromSqlError::InvalidType);
        }
        let mut timestamp = Timestamp::default();
        timestamp
            .scan(driver_value(value)?)
            .map_err(|err| match err {
                ScanError::TypeMismatch { .. } => FromSqlError::InvalidType,
                other => FromSqlError::Other(Box::new(other)),
            })?;
        Ok(timestamp)
    }
}

impl ToSql for Duration {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.nanoseconds))
    }
}

impl FromSql for Duration {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Duration::from_nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;
    use chrono::{DateTime, Utc};
    use rusqlite::{params, Connection};

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE events (at TEXT, took INTEGER)", [])
            .unwrap();
        conn
    }

    fn sample() -> Timestamp {
        let instant: DateTime<Utc> = "2024-01-15T10:00:00.000000123Z".parse().unwrap();
        Timestamp::from_instant(&instant, Zone::Named(chrono_tz::Europe::Berlin))
    }

    #[test]
    fn test_roundtrip_through_sqlite() {
        let conn = connection();
        let took = Duration::from_nanos(-1_500_000_000);
        conn.execute(
            "INSERT INTO events (at, took) VALUES (?1, ?2)",
            params![sample(), took],
        )
        .unwrap();

        let (at, back): (Timestamp, Duration) = conn
            .query_row("SELECT at, took FROM events", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();

        assert_eq!(at.total_nanos(), sample().total_nanos());
        assert_eq!(at.location_name, "+01:00");
        assert_eq!(back, took);
    }

    #[test]
    fn test_stored_as_rfc3339_text() {
        let conn = connection();
        conn.execute("INSERT INTO events (at) VALUES (?1)", params![sample()])
            .unwrap();
        let text: String = conn
            .query_row("SELECT at FROM events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(text, "2024-01-15T11:00:00.000000123+01:00");
    }

    #[test]
    fn test_local_mean_time_keeps_instant() {
        let conn = connection();
        let instant: DateTime<Utc> = "1850-06-01T12:00:00Z".parse().unwrap();
        let at = Timestamp::from_instant(&instant, Zone::Named(chrono_tz::Europe::Berlin));
        conn.execute("INSERT INTO events (at) VALUES (?1)", params![at])
            .unwrap();

        let (text, back): (String, Timestamp) = conn
            .query_row("SELECT at, at FROM events", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(text, "1850-06-01T12:00:00Z");
        assert_eq!(back.seconds, instant.timestamp());
        assert_eq!(back.location_name, "UTC");
    }

    #[test]
    fn test_null_column_reads_as_none() {
        let conn = connection();
        conn.execute(
            "INSERT INTO events (at, took) VALUES (?1, ?2)",
            params![None::<Timestamp>, None::<Duration>],
        )
        .unwrap();
        let (at, took): (Option<Timestamp>, Option<Duration>) = conn
            .query_row("SELECT at, took FROM events", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(at, None);
        assert_eq!(took, None);
    }

    #[test]
    fn test_integer_column_is_not_a_timestamp() {
        let conn = connection();
        conn.execute("INSERT INTO events (took) VALUES (5)", [])
            .unwrap();
        let result: rusqlite::Result<Timestamp> =
            conn.query_row("SELECT took FROM events", [], |row| row.get(0));
        assert!(matches!(
            result,
            Err(rusqlite::Error::InvalidColumnType(..))
        ));
    }

    #[test]
    fn test_malformed_text_is_reported() {
        let conn = connection();
        conn.execute("INSERT INTO events (at) VALUES ('yesterday')", [])
            .unwrap();
        let result: rusqlite::Result<Timestamp> =
            conn.query_row("SELECT at FROM events", [], |row| row.get(0));
        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(..))
        ));
    }
}
