use std::fmt;

/// Result type for viscose-sheet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur talking to a spreadsheet
#[derive(Debug)]
pub enum Error {
    /// HTTP request could not be sent or its body read
    Http(reqwest::Error),

    /// Remote answered with a non-success status
    Status { code: u16, body: String },

    /// Response body did not have the expected shape
    Json(serde_json::Error),

    /// Missing or unusable credentials
    Auth(String),

    /// Worksheet does not exist
    WorksheetNotFound(String),

    /// Invalid configuration value (scan range, URL, ...)
    Config(String),

    /// IO operation failed (local workbook)
    Io(std::io::Error),

    /// CSV decoding failed (local workbook)
    Csv(csv::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(err) => write!(f, "HTTP error: {}", err),
            Error::Status { code, body } => {
                if body.is_empty() {
                    write!(f, "Sheet API returned status {}", code)
                } else {
                    write!(f, "Sheet API returned status {}: {}", code, body)
                }
            }
            Error::Json(err) => write!(f, "Unexpected response: {}", err),
            Error::Auth(msg) => write!(f, "Authentication error: {}", msg),
            Error::WorksheetNotFound(name) => write!(f, "Worksheet not found: '{}'", name),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Csv(err) => write!(f, "CSV error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Csv(err) => Some(err),
            Error::Status { .. }
            | Error::Auth(_)
            | Error::WorksheetNotFound(_)
            | Error::Config(_) => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
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
