pub mod bids;
pub mod connection;
pub mod jobs;
pub mod reference;

pub use connection::{init_db, Database};

use crate::errors::ServerError;
use rusqlite::types::Type;
use rusqlite::ErrorCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;

/// Parse a TEXT column into one of the domain enums.
pub(crate) fn parse_text<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Read a JSON array column.
pub(crate) fn parse_json<T: DeserializeOwned>(idx: usize, raw: String) -> rusqlite::Result<T> {
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, ServerError> {
    serde_json::to_string(value).map_err(|e| ServerError::DbError(format!("encode failed: {e}")))
}

/// Constraint violations and lock timeouts surface as conflicts; everything else is a DB error.
pub(crate) fn write_error(what: &str, err: rusqlite::Error) -> ServerError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            ServerError::Conflict(format!("{what}: {err}"))
        }
        _ if crate::errors::is_busy(&err) => ServerError::Conflict(format!("{what}: {err}")),
        _ => ServerError::DbError(format!("{what}: {err}")),
    }
}
