use rusqlite::ErrorCode;
use std::fmt;

/// Result type for viscose-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the state layer
#[derive(Debug)]
pub enum Error {
    /// Database operation failed
    Database(rusqlite::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// JSON decoding failed (legacy state import)
    Json(serde_json::Error),

    /// Stored data is unreadable (unknown schema version, malformed values)
    Corrupt(String),
}

impl Error {
    /// Whether the backing file should be discarded and state restarted empty
    pub fn is_corruption(&self) -> bool {
        match self {
            Error::Corrupt(_) => true,
            Error::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt
            ),
            Error::Database(
                rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..),
            ) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database(err) => write!(f, "State database error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Corrupt(msg) => write!(f, "State file is corrupt: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Corrupt(_) => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
