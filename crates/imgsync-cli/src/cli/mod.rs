//! CLI for imgsync.

mod localize;

use anyhow::Result;
use clap::Parser;
use imgsync_core::config::{self, ImgsyncConfig};
use imgsync_core::run::LocalizeOptions;
use std::path::{Path, PathBuf};

pub use localize::run_localize;

/// Download the images a JSON manifest points at and rewrite it to local paths.
#[derive(Debug, Parser)]
#[command(name = "imgsync")]
#[command(
    about = "Download remote images referenced by a JSON manifest and rewrite them to local paths",
    long_about = None
)]
pub struct Cli {
    /// Directory the default manifest and image paths are resolved against (default: current dir).
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Input manifest: a JSON array of records.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Output manifest with rewritten image paths.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Directory downloaded images are written to.
    #[arg(long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Rename downloads to match the response Content-Type when the URL has no extension hint.
    #[arg(long)]
    pub refine_extension: bool,

    /// Per-request timeout in seconds (at least 1).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// User-Agent header sent with each request.
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let root = match &cli.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        let cfg = cli.apply_overrides(cfg);
        let opts = cli.localize_options(&cfg, &root);

        run_localize(opts, cfg.fetch).await
    }

    /// Config with fetch settings from the command line applied.
    pub fn apply_overrides(&self, mut cfg: ImgsyncConfig) -> ImgsyncConfig {
        if let Some(secs) = self.timeout {
            cfg.fetch.timeout_secs = secs;
        }
        if let Some(ua) = &self.user_agent {
            cfg.fetch.user_agent = ua.clone();
        }
        if self.refine_extension {
            cfg.refine_extension = true;
        }
        cfg
    }

    /// Paths from the config resolved against `root`, with explicit flags taking precedence.
    pub fn localize_options(&self, cfg: &ImgsyncConfig, root: &Path) -> LocalizeOptions {
        let mut opts = LocalizeOptions::from_config(cfg, root);
        if let Some(file) = &self.file {
            opts.input = file.clone();
        }
        if let Some(out) = &self.out {
            opts.output = out.clone();
        }
        if let Some(outdir) = &self.outdir {
            opts.outdir = outdir.clone();
        }
        opts
    }
}

#[cfg(test)]
mod tests;
