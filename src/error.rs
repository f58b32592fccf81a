use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaraError {
    #[error("missing api token: set CARA_XTOKEN")]
    MissingToken,

    #[error("invalid date range: start {start} must be before or equal to end {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid or unexpected response format")]
    InvalidResponse,

    #[error("api rejected request: {0}")]
    Api(#[from] ApiError),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

impl CaraError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CaraError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authorized, check the token ({0})")]
    Unauthorized(reqwest::StatusCode),

    #[error("resource not found (404)")]
    NotFound,

    #[error("unexpected status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}
