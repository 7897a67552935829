// src/error.rs

use serde::Serialize;
use thiserror::Error;
use warp::http::StatusCode;

/// Message used for every "dataset file is missing" response.
pub const CSV_NOT_FOUND: &str = "CSV file not found";

/// Every way a request can fail. None of these are retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid dataset identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    NotFound(&'static str),

    /// `path` is kept for logs and never rendered into the message.
    #[error("failed to read dataset: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV at line {line}: {message}")]
    Parse {
        path: String,
        line: u64,
        message: String,
    },

    #[error("unparseable date {value:?} on line {line}")]
    DateFormat { value: String, line: u64 },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidIdentifier(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Io { .. } | ApiError::Parse { .. } | ApiError::DateFormat { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidIdentifier(_) => "invalid_identifier",
            ApiError::InvalidQuery(_) => "invalid_query",
            ApiError::NotFound(_) => "not_found",
            ApiError::Io { .. } => "io_error",
            ApiError::Parse { .. } => "parse_error",
            ApiError::DateFormat { .. } => "date_format_error",
        }
    }

    /// Server-side file behind the failure, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ApiError::Io { path, .. } | ApiError::Parse { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        }
    }

    /// Classify a failed open/read. `NotFound` is the only kind surfaced as 404.
    pub fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ApiError::NotFound(CSV_NOT_FOUND)
        } else {
            ApiError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    }
}

impl warp::reject::Reject for ApiError {}

/// The single JSON error envelope used by every route.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_not_found_message_is_stable() {
        let err = ApiError::NotFound(CSV_NOT_FOUND);
        let body = err.body();
        assert_eq!(body.error, "CSV file not found");
        assert_eq!(body.kind, "not_found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_io_classification() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            ApiError::from_io(Path::new("x.csv"), missing),
            ApiError::NotFound(CSV_NOT_FOUND)
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err = ApiError::from_io(Path::new("x.csv"), denied);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "io_error");
    }

    #[test]
    fn test_body_omits_server_paths() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let io_err = ApiError::from_io(Path::new("/srv/rovista/asn/64512.csv"), denied);
        let parse_err = ApiError::Parse {
            path: "/srv/rovista/asn/64512.csv".into(),
            line: 3,
            message: "found record with 1 fields".into(),
        };
        for err in [io_err, parse_err] {
            assert_eq!(err.path(), Some("/srv/rovista/asn/64512.csv"));
            let body = err.body();
            assert!(!body.error.contains("/srv"), "{}", body.error);
        }
    }

    #[test]
    fn test_status_mapping() {
        let date = ApiError::DateFormat {
            value: String::new(),
            line: 2,
        };
        assert_eq!(date.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::InvalidIdentifier("../x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
