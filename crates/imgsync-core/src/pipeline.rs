//! Per-record localization pass.
//!
//! Each record is visited once, in order, and ends in exactly one
//! [`RecordOutcome`]: skipped (no eligible URL), resolved (file written and
//! `image` rewritten) or failed (fetch error, record untouched). A failed
//! record never stops the pass.

use crate::allocator::ClaimedNames;
use crate::fetch::{FetchError, Fetcher};
use crate::manifest::{ImageRef, Record};
use crate::url_model::{
    extension_from_content_type, extension_from_url, is_eligible_url, positional_slug,
    resolve_extension, slugify,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name used in rewritten paths when the output dir has no final component.
const DEFAULT_PUBLIC_DIR: &str = "imgs";

/// Terminal state of one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// No `image`, non-string `image`, or not an HTTP(S) URL.
    Skipped,
    /// Image stored as `filename`; the record now points at `local_path`.
    Resolved {
        url: String,
        filename: String,
        local_path: String,
        content_type: String,
    },
    /// The fetch failed; the record keeps its original URL.
    Failed { url: String, error: FetchError },
}

impl RecordOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, RecordOutcome::Resolved { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RecordOutcome::Failed { .. })
    }
}

/// Outcomes of a whole pass, indexed like the manifest.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<RecordOutcome>,
}

impl RunSummary {
    /// Number of images written.
    pub fn downloaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_resolved()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Skipped))
            .count()
    }
}

/// Drives fetches for a manifest into one output directory.
pub struct Pipeline<F> {
    fetcher: F,
    outdir: PathBuf,
    public_dir: String,
    refine_extension: bool,
}

impl<F: Fetcher> Pipeline<F> {
    /// Rewritten paths take the form `/<outdir basename>/<filename>`.
    pub fn new(fetcher: F, outdir: impl Into<PathBuf>) -> Self {
        let outdir = outdir.into();
        let public_dir = outdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_PUBLIC_DIR.to_string());
        Self {
            fetcher,
            outdir,
            public_dir,
            refine_extension: false,
        }
    }

    /// Rename downloads whose URL gave no extension hint to match the response content type.
    pub fn refine_extension(mut self, enabled: bool) -> Self {
        self.refine_extension = enabled;
        self
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    pub fn local_path(&self, filename: &str) -> String {
        format!("/{}/{}", self.public_dir, filename)
    }

    /// Processes every record in order. `on_outcome` is called right after each
    /// record reaches its terminal state.
    pub fn run<C>(
        &mut self,
        records: &mut [Record],
        claimed: &mut ClaimedNames,
        mut on_outcome: C,
    ) -> RunSummary
    where
        C: FnMut(usize, &RecordOutcome),
    {
        let mut summary = RunSummary {
            outcomes: Vec::with_capacity(records.len()),
        };
        for (index, record) in records.iter_mut().enumerate() {
            let outcome = self.process_record(index, record, claimed);
            on_outcome(index, &outcome);
            summary.outcomes.push(outcome);
        }
        tracing::info!(
            downloaded = summary.downloaded(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "pipeline finished"
        );
        summary
    }

    /// Localizes a single record at position `index`.
    pub fn process_record(
        &mut self,
        index: usize,
        record: &mut Record,
        claimed: &mut ClaimedNames,
    ) -> RecordOutcome {
        let url = match record.image() {
            ImageRef::Text(url) if is_eligible_url(url) => url.to_string(),
            other => {
                tracing::debug!(index, image = ?other, "skipping record without remote image");
                return RecordOutcome::Skipped;
            }
        };

        let slug = match record.topic() {
            Some(topic) if !topic.is_empty() => slugify(topic),
            _ => positional_slug(index),
        };
        let ext = resolve_extension(&url, None);
        let filename = claimed.allocate(&slug, ext);
        let dest = self.outdir.join(&filename);

        let fetched = match self.fetcher.fetch(&url, &dest) {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::debug!(index, url = %url, "{}", error);
                return RecordOutcome::Failed { url, error };
            }
        };

        let filename = if self.refine_extension && extension_from_url(&url).is_none() {
            self.refined_name(&slug, ext, filename, &fetched.content_type, claimed)
        } else {
            filename
        };

        claimed.claim(filename.clone());
        let local_path = self.local_path(&filename);
        record.set_image(local_path.clone());
        tracing::info!(index, url = %url, path = %local_path, "saved");

        RecordOutcome::Resolved {
            url,
            filename,
            local_path,
            content_type: fetched.content_type,
        }
    }

    /// Moves a fresh download to a name matching its content type, if that differs.
    /// Keeps the original name if the content type gives nothing or the rename fails.
    fn refined_name(
        &self,
        slug: &str,
        provisional: &str,
        filename: String,
        content_type: &str,
        claimed: &ClaimedNames,
    ) -> String {
        let refined = match extension_from_content_type(content_type) {
            Some(ext) if ext != provisional => ext,
            _ => return filename,
        };
        let renamed = claimed.allocate(slug, refined);
        match fs::rename(self.outdir.join(&filename), self.outdir.join(&renamed)) {
            Ok(()) => {
                tracing::debug!(from = %filename, to = %renamed, "refined extension");
                renamed
            }
            Err(e) => {
                tracing::warn!("could not rename {} to {}: {}", filename, renamed, e);
                filename
            }
        }
    }
}
