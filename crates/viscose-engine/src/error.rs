use std::fmt;

/// Result type for viscose-engine operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Persisting local state failed
    Store(viscose_store::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
        }
    }
}

impl From<viscose_store::Error> for Error {
    fn from(err: viscose_store::Error) -> Self {
        Error::Store(err)
    }
}
