use std::fmt;

/// Result type for viscose-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Stats discovery error
    Stats(viscose_stats::Error),

    /// Local state error
    Store(viscose_store::Error),

    /// Spreadsheet transport error
    Sheet(viscose_sheet::Error),

    /// Engine error
    Engine(viscose_engine::Error),

    /// File watcher could not be set up
    Watch(notify::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Workspace not initialized
    NotInitialized(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Stats(err) => write!(f, "Stats error: {}", err),
            Error::Store(err) => write!(f, "{}", err),
            Error::Sheet(err) => write!(f, "Sheet error: {}", err),
            Error::Engine(err) => write!(f, "{}", err),
            Error::Watch(err) => write!(f, "Watch error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::NotInitialized(msg) => write!(f, "Workspace not initialized: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Stats(err) => Some(err),
            Error::Store(err) => Some(err),
            Error::Sheet(err) => Some(err),
            Error::Engine(err) => Some(err),
            Error::Watch(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::NotInitialized(_) => None,
        }
    }
}

impl From<viscose_stats::Error> for Error {
    fn from(err: viscose_stats::Error) -> Self {
        Error::Stats(err)
    }
}

impl From<viscose_store::Error> for Error {
    fn from(err: viscose_store::Error) -> Self {
        Error::Store(err)
    }
}

impl From<viscose_sheet::Error> for Error {
    fn from(err: viscose_sheet::Error) -> Self {
        Error::Sheet(err)
    }
}

impl From<viscose_engine::Error> for Error {
    fn from(err: viscose_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
