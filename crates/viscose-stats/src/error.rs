use std::fmt;
use std::path::PathBuf;

/// Result type for viscose-stats operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading stats exports
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// CSV decoding failed
    Csv(csv::Error),

    /// File is not a well-formed stats export (missing fields, bad number, empty)
    Parse { path: PathBuf, message: String },

    /// Stats root missing or not traversable
    StatsRoot { path: PathBuf, message: String },

    /// Walkdir error
    WalkDir(walkdir::Error),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Reading failed rather than the contents being malformed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Io(_) | Error::WalkDir(_) => true,
            Error::Csv(err) => matches!(err.kind(), csv::ErrorKind::Io(_)),
            Error::Parse { .. } | Error::StatsRoot { .. } => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Csv(err) => write!(f, "CSV error: {}", err),
            Error::Parse { path, message } => {
                write!(f, "Parse error in {}: {}", path.display(), message)
            }
            Error::StatsRoot { path, message } => {
                write!(f, "Cannot read stats root {}: {}", path.display(), message)
            }
            Error::WalkDir(err) => write!(f, "Directory traversal error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Csv(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Parse { .. } | Error::StatsRoot { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDir(err)
    }
}
