// errors.rs
use std::fmt;

/// Errors originating from either the domain rules
/// (validation, conflicts, missing resources) or downstream layers (DB, XLSX).
#[derive(Debug)]
pub enum ServerError {
    NotFound(String),
    BadRequest(String),
    Validation(String),
    Conflict(String),
    DbError(String),
    XlsxError(String),
    InternalError,
}

impl ServerError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::NotFound(_) => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Validation(_) => 422,
            ServerError::Conflict(_) => 409,
            ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => {
                500
            }
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound(what) => write!(f, "Not Found: {what}"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::Validation(msg) => write!(f, "Validation Error: {msg}"),
            ServerError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::XlsxError(msg) => write!(f, "Spreadsheet Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}

/// Another writer held the database past the busy timeout.
pub fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
}

impl From<rusqlite::Error> for ServerError {
    fn from(err: rusqlite::Error) -> Self {
        if is_busy(&err) {
            return ServerError::Conflict(format!("job store is busy, retry: {err}"));
        }
        ServerError::DbError(err.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("invalid JSON: {err}"))
    }
}
