//! Single-attempt image fetch to a local file.
//!
//! The [`Fetcher`] trait is the seam between the pipeline and the network;
//! [`CurlFetcher`] is the libcurl implementation used by the CLI. Bodies are
//! streamed to an exclusively created temp file next to `dest` and persisted
//! onto `dest` only after the whole transfer succeeded.

mod curl_fetcher;
mod error;

pub use curl_fetcher::CurlFetcher;
pub use error::{FetchCause, FetchError};

use std::path::Path;

/// Suffix of in-progress downloads. Temp names also start with `.` and carry
/// random characters, so they never match an allocated image name.
pub const TEMP_SUFFIX: &str = ".part";

/// Metadata of a completed fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fetched {
    /// Declared `Content-Type` of the final response; empty if absent.
    pub content_type: String,
    /// Number of body bytes written.
    pub bytes: u64,
}

/// Retrieves one URL and persists the body at `dest`, overwriting any existing file.
pub trait Fetcher {
    fn fetch(&mut self, url: &str, dest: &Path) -> Result<Fetched, FetchError>;
}
