//! End-to-end localization of one manifest.
//!
//! Structural checks run first (input present, output dir usable, manifest
//! shape); only then is any record fetched. The output manifest is written
//! once, after the last record.

use crate::allocator::ClaimedNames;
use crate::config::ImgsyncConfig;
use crate::fetch::Fetcher;
use crate::manifest::{self, ManifestError};
use crate::pipeline::{Pipeline, RecordOutcome, RunSummary};
use std::fs;
use std::path::{Path, PathBuf};

/// Where to read, where to write, and how to name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outdir: PathBuf,
    pub refine_extension: bool,
}

impl LocalizeOptions {
    /// Options from the configured paths, resolved against `root`.
    pub fn from_config(cfg: &ImgsyncConfig, root: &Path) -> Self {
        let (input, output, outdir) = cfg.paths.resolve(root);
        Self {
            input,
            output,
            outdir,
            refine_extension: cfg.refine_extension,
        }
    }
}

/// Prepares the output directory, returning the path whose basename names rewritten images.
fn prepare_outdir(outdir: &Path) -> Result<PathBuf, ManifestError> {
    let to_err = |source: std::io::Error| ManifestError::OutputDir {
        path: outdir.to_path_buf(),
        source,
    };
    fs::create_dir_all(outdir).map_err(to_err)?;
    if outdir.file_name().is_some() {
        Ok(outdir.to_path_buf())
    } else {
        // `.`, `..` or `/`: use the real directory name.
        fs::canonicalize(outdir).map_err(to_err)
    }
}

/// Localizes every eligible image referenced by the manifest at `opts.input`.
///
/// `on_outcome` sees each record's outcome as soon as it is reached. Returns
/// the run summary once the output manifest has been written.
pub fn localize<F, C>(
    opts: &LocalizeOptions,
    fetcher: F,
    on_outcome: C,
) -> Result<RunSummary, ManifestError>
where
    F: Fetcher,
    C: FnMut(usize, &RecordOutcome),
{
    if !opts.input.exists() {
        return Err(ManifestError::NotFound(opts.input.clone()));
    }
    let outdir = prepare_outdir(&opts.outdir)?;

    let mut records = manifest::load(&opts.input)?;
    let mut claimed = ClaimedNames::from_dir(&outdir).map_err(|source| ManifestError::OutputDir {
        path: outdir.clone(),
        source,
    })?;
    tracing::info!(
        input = %opts.input.display(),
        records = records.len(),
        claimed = claimed.len(),
        "localizing manifest"
    );

    let mut pipeline = Pipeline::new(fetcher, outdir).refine_extension(opts.refine_extension);
    let summary = pipeline.run(&mut records, &mut claimed, on_outcome);

    manifest::save(&opts.output, &records)?;
    tracing::info!(output = %opts.output.display(), "wrote manifest");

    Ok(summary)
}
