//! Column conversion helpers shared by the query modules.

use jiff::Timestamp;
use rusqlite::types::Type;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Converts a timestamp to its stored form (microseconds since the epoch).
pub(crate) fn timestamp_to_sql(ts: &Timestamp) -> i64 {
    ts.as_microsecond()
}

/// The current time at the precision timestamps are stored with.
pub(crate) fn now() -> Timestamp {
    let now = Timestamp::now();
    Timestamp::from_microsecond(now.as_microsecond()).unwrap_or(now)
}

/// Converts a stored column back into a timestamp.
pub(crate) fn timestamp_from_sql(column: usize, micros: i64) -> rusqlite::Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, Type::Integer, Box::new(e))
    })
}

pub(crate) fn optional_timestamp_from_sql(
    column: usize,
    micros: Option<i64>,
) -> rusqlite::Result<Option<Timestamp>> {
    micros.map(|m| timestamp_from_sql(column, m)).transpose()
}

/// Decodes a JSON text column.
pub(crate) fn json_from_sql<T: DeserializeOwned>(column: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_str(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Encodes a value for a JSON text column.
pub(crate) fn json_to_sql<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a status-like text column through `FromStr`.
pub(crate) fn parse_from_sql<T>(column: usize, text: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    text.parse::<T>().map_err(|reason| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, reason)),
        )
    })
}
