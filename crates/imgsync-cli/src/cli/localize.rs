//! `imgsync` main action: localize a manifest and report progress.

use anyhow::{Context, Result};
use imgsync_core::config::FetchConfig;
use imgsync_core::fetch::CurlFetcher;
use imgsync_core::pipeline::RecordOutcome;
use imgsync_core::run::{self, LocalizeOptions};

/// Prints one line per fetched or failed record.
fn report(outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Resolved {
            url, local_path, ..
        } => println!("Saved {url} -> {local_path}"),
        RecordOutcome::Failed { url, error } => {
            eprintln!("Failed to download {url}: {}", error.cause)
        }
        RecordOutcome::Skipped => {}
    }
}

pub async fn run_localize(opts: LocalizeOptions, fetch: FetchConfig) -> Result<()> {
    let output = opts.output.clone();
    tracing::info!(
        input = %opts.input.display(),
        outdir = %opts.outdir.display(),
        timeout_secs = fetch.timeout_secs,
        "starting run"
    );

    // curl transfers block; keep them off the async workers.
    let summary = tokio::task::spawn_blocking(move || {
        let fetcher = CurlFetcher::new(&fetch);
        run::localize(&opts, fetcher, |_, outcome| report(outcome))
    })
    .await
    .context("localize task failed")??;

    if summary.failed() > 0 {
        tracing::warn!("{} image(s) could not be downloaded", summary.failed());
    }
    println!(
        "Done. Downloaded {} images. Wrote {}.",
        summary.downloaded(),
        output.display()
    );
    Ok(())
}
