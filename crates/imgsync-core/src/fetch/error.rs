//! Fetch failure type: one error per URL, carrying the underlying cause.

use thiserror::Error;

/// Why a single fetch failed.
#[derive(Debug, Error)]
pub enum FetchCause {
    /// Curl reported an error (timeout, DNS, connection refused, bad URL, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Final response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing or renaming the local file failed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

impl FetchCause {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchCause::Transport(e) if e.is_operation_timedout())
    }
}

/// A failed fetch of `url`.
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: impl Into<FetchCause>) -> Self {
        Self {
            url: url.into(),
            cause: cause.into(),
        }
    }
}
