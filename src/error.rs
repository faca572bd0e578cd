//! Errors raised at the network edges.
//!
//! None of these ever reach the poll loop: the session controller turns each one
//! into a fallback slide or a logged warning.

use thiserror::Error;

/// Errors that can occur while talking to a data source or the board.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed (network, timeout, TLS, or body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response arrived but did not have the expected shape
    #[error("parse failed: {0}")]
    Parse(String),

    /// A credential or URL needed for this source is not configured
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}
