use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::request::ResponseStatus;

/// Already logged by the time it is returned.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{source}")]
    HttpStatus {
        status: ResponseStatus,
        #[source]
        source: reqwest::Error,
    },

    /// No usable response: bad URL, DNS, connect failure, timeout.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] io::Error),

    #[error("{context} {path:?}: {source}")]
    Output {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<&ResponseStatus> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(status),
            _ => None,
        }
    }
}
