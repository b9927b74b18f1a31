//! Blocking single-GET fetcher on libcurl.

use super::{FetchCause, FetchError, Fetched, Fetcher, TEMP_SUFFIX};
use crate::config::FetchConfig;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Fetches with one curl `Easy` transfer per URL. No retries.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    max_redirections: u32,
}

impl CurlFetcher {
    pub fn new(cfg: &FetchConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            timeout: cfg.timeout(),
            connect_timeout: cfg.connect_timeout(),
            max_redirections: cfg.max_redirections,
        }
    }

    /// Runs the transfer, streaming the body into `file`.
    fn transfer(&self, url: &str, file: &mut File) -> Result<Fetched, FetchCause> {
        let mut bytes = 0u64;
        let mut write_err: Option<io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.useragent(&self.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.connect_timeout(self.connect_timeout.min(self.timeout))?;
        easy.timeout(self.timeout)?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => {
                    bytes += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(FetchCause::Storage(e));
        }
        performed?;

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchCause::Http(code));
        }

        let content_type = easy.content_type()?.unwrap_or_default().to_string();
        file.sync_all()?;

        Ok(Fetched {
            content_type,
            bytes,
        })
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

/// Creates the temp file in the destination's directory so the final rename stays on one filesystem.
fn temp_file_for(dest: &Path) -> io::Result<tempfile::NamedTempFile> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    tempfile::Builder::new()
        .prefix(".")
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
}

impl Fetcher for CurlFetcher {
    fn fetch(&mut self, url: &str, dest: &Path) -> Result<Fetched, FetchError> {
        // Dropping the temp file on any error path removes it.
        let result = temp_file_for(dest)
            .map_err(FetchCause::from)
            .and_then(|mut part| {
                let fetched = self.transfer(url, part.as_file_mut())?;
                part.persist(dest).map_err(|e| FetchCause::Storage(e.error))?;
                Ok(fetched)
            });

        match result {
            Ok(fetched) => {
                tracing::debug!(
                    url,
                    dest = %dest.display(),
                    bytes = fetched.bytes,
                    content_type = %fetched.content_type,
                    "fetched"
                );
                Ok(fetched)
            }
            Err(cause) => Err(FetchError::new(url, cause)),
        }
    }
}
