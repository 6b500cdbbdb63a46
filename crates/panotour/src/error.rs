//! Error types for the panotour crate.

use std::fmt;

use crate::types::SceneId;

/// Result type for panotour operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching records or loading a tour graph.
#[derive(Debug)]
pub enum Error {
    /// HTTP request failed.
    Http {
        /// The URL that failed.
        url: String,
        /// The error message.
        message: String,
    },
    /// HTTP response had a non-success status code.
    HttpStatus {
        /// The URL that returned the error.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
    /// A response body or record could not be decoded.
    Decode {
        /// Context for where the error occurred.
        context: &'static str,
        /// The error message.
        message: String,
    },
    /// The requested scene does not exist in the store.
    NotFound(SceneId),
    /// A scene identifier could not be parsed.
    InvalidSceneId(String),
    /// Required configuration was missing or malformed.
    Config {
        /// The setting that was missing or malformed.
        key: &'static str,
        /// Description of the problem.
        detail: String,
    },
    /// Cache operation failed.
    Cache {
        /// The operation that failed.
        operation: &'static str,
        /// The error message.
        message: String,
    },
    /// A static tour file could not be read.
    TourFile {
        /// The path of the file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http { url, message } => {
                write!(f, "http request to {url} failed: {message}")
            }
            Error::HttpStatus { url, status } => {
                write!(f, "http request to {url} returned status {status}")
            }
            Error::Decode { context, message } => {
                write!(f, "failed to decode {context}: {message}")
            }
            Error::NotFound(id) => write!(f, "scene {id} not found"),
            Error::InvalidSceneId(raw) => write!(f, "invalid scene id {raw:?}"),
            Error::Config { key, detail } => {
                write!(f, "invalid configuration for {key}: {detail}")
            }
            Error::Cache { operation, message } => {
                write!(f, "cache {operation} failed: {message}")
            }
            Error::TourFile { path, source } => {
                write!(f, "failed to read tour file {path}: {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TourFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode {
            context: "json",
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found() {
        let err = Error::NotFound(SceneId(7));
        assert_eq!(err.to_string(), "scene 7 not found");
    }

    #[test]
    fn test_tour_file_has_source() {
        let err = Error::TourFile {
            path: "tour.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("tour.json"));
    }
}
