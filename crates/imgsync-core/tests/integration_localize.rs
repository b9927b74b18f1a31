//! Integration test: local HTTP server, curl fetcher, full manifest run.
//!
//! Each test writes an input manifest into a temp root, localizes it against
//! a throwaway server and checks the rewritten manifest and the files on disk.

mod common;

use common::image_server::{self, Route};
use imgsync_core::config::{FetchConfig, ImgsyncConfig};
use imgsync_core::fetch::{CurlFetcher, FetchCause, Fetcher};
use imgsync_core::pipeline::{RecordOutcome, RunSummary};
use imgsync_core::run::{localize, LocalizeOptions};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-png-body";

fn options(root: &Path) -> LocalizeOptions {
    LocalizeOptions::from_config(&ImgsyncConfig::default(), root)
}

fn run(opts: &LocalizeOptions, input: &Value) -> (RunSummary, Value) {
    fs::write(&opts.input, input.to_string()).unwrap();
    let summary = localize(opts, CurlFetcher::default(), |_, _| {}).expect("localize");
    let output = serde_json::from_str(&fs::read_to_string(&opts.output).unwrap()).unwrap();
    (summary, output)
}

fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn binary_search_image_is_saved_and_rewritten() {
    let base = image_server::start(vec![("/a.png", Route::image("image/png", PNG))]);
    let root = tempdir().unwrap();
    let opts = options(root.path());

    let input = json!([{"topic": "Binary Search", "image": format!("{base}/a.png")}]);
    let (summary, output) = run(&opts, &input);

    assert_eq!(summary.downloaded(), 1);
    assert_eq!(
        output,
        json!([{"topic": "Binary Search", "image": "/imgs/binary-search.png"}])
    );
    assert_eq!(fs::read(opts.outdir.join("binary-search.png")).unwrap(), PNG);
    assert_eq!(dir_names(&opts.outdir), ["binary-search.png"]);
}

#[test]
fn one_unreachable_url_does_not_stop_the_run() {
    let base = image_server::start(vec![
        ("/one.jpg", Route::image("image/jpeg", b"one")),
        ("/three.gif", Route::image("image/gif", b"three")),
    ]);
    let dead = image_server::unreachable_base();
    let root = tempdir().unwrap();
    let opts = options(root.path());

    let input = json!([
        {"id": 1, "topic": "One", "image": format!("{base}/one.jpg")},
        {"id": 2, "topic": "Two", "image": format!("{dead}/two.png")},
        {"id": 3, "topic": "Three", "image": format!("{base}/three.gif")}
    ]);
    let (summary, output) = run(&opts, &input);

    assert_eq!(summary.downloaded(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(
        output,
        json!([
            {"id": 1, "topic": "One", "image": "/imgs/one.jpg"},
            {"id": 2, "topic": "Two", "image": format!("{dead}/two.png")},
            {"id": 3, "topic": "Three", "image": "/imgs/three.gif"}
        ])
    );
    assert_eq!(dir_names(&opts.outdir), ["one.jpg", "three.gif"]);
}

#[test]
fn http_error_status_is_a_failure() {
    let base = image_server::start(vec![("/gone.png", Route::Status(410))]);
    let root = tempdir().unwrap();
    let opts = options(root.path());

    let input = json!([{"topic": "Gone", "image": format!("{base}/gone.png")}]);
    let (summary, output) = run(&opts, &input);

    assert_eq!(output, input);
    match &summary.outcomes[0] {
        RecordOutcome::Failed { error, .. } => {
            assert!(matches!(error.cause, FetchCause::Http(410)));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(fs::read_dir(&opts.outdir).unwrap().count(), 0);
}

#[test]
fn existing_part_file_is_left_untouched() {
    let base = image_server::start(vec![("/a.png", Route::image("image/png", PNG))]);
    let root = tempdir().unwrap();
    let opts = options(root.path());
    fs::create_dir(&opts.outdir).unwrap();
    fs::write(opts.outdir.join("sort.png.part"), b"user data").unwrap();

    let input = json!([{"topic": "Sort", "image": format!("{base}/a.png")}]);
    let (_, output) = run(&opts, &input);

    assert_eq!(output[0]["image"], "/imgs/sort.png");
    assert_eq!(dir_names(&opts.outdir), ["sort.png", "sort.png.part"]);
    assert_eq!(fs::read(opts.outdir.join("sort.png.part")).unwrap(), b"user data");
    assert_eq!(fs::read(opts.outdir.join("sort.png")).unwrap(), PNG);
}

#[test]
fn same_topic_twice_gets_numbered() {
    let base = image_server::start(vec![
        ("/x.png", Route::image("image/png", b"x")),
        ("/y.png", Route::image("image/png", b"y")),
    ]);
    let root = tempdir().unwrap();
    let opts = options(root.path());

    let input = json!([
        {"topic": "Sort", "image": format!("{base}/x.png")},
        {"topic": "Sort", "image": format!("{base}/y.png")}
    ]);
    let (_, output) = run(&opts, &input);

    assert_eq!(output[0]["image"], "/imgs/sort.png");
    assert_eq!(output[1]["image"], "/imgs/sort-1.png");
    assert_eq!(fs::read(opts.outdir.join("sort.png")).unwrap(), b"x");
    assert_eq!(fs::read(opts.outdir.join("sort-1.png")).unwrap(), b"y");
}

#[test]
fn not_a_url_is_left_alone() {
    let root = tempdir().unwrap();
    let opts = options(root.path());

    let input = json!([{"topic": "Graphs", "image": "not-a-url"}]);
    let (summary, output) = run(&opts, &input);

    assert_eq!(summary.downloaded(), 0);
    assert_eq!(output, input);
    assert_eq!(fs::read_dir(&opts.outdir).unwrap().count(), 0);
}

#[test]
fn rerun_is_stable() {
    let base = image_server::start(vec![("/a.png", Route::image("image/png", PNG))]);
    let root = tempdir().unwrap();
    let opts = options(root.path());
    let input = json!([
        {"topic": "Trees", "image": format!("{base}/a.png")},
        {"topic": "Local", "image": "/imgs/local.png"}
    ]);

    let (_, first) = run(&opts, &input);
    assert_eq!(first[0]["image"], "/imgs/trees.png");

    // Feeding the output back in finds nothing left to fetch.
    let again = LocalizeOptions {
        input: opts.output.clone(),
        output: root.path().join("again.json"),
        ..opts.clone()
    };
    let summary = localize(&again, CurlFetcher::default(), |_, _| {}).unwrap();
    assert_eq!(summary.downloaded(), 0);
    let second: Value =
        serde_json::from_str(&fs::read_to_string(&again.output).unwrap()).unwrap();
    assert_eq!(second, first);

    // Re-running the original input keeps the first file and numbers the new one.
    let (_, third) = run(&opts, &input);
    assert_eq!(third[0]["image"], "/imgs/trees-1.png");
    assert_eq!(fs::read(opts.outdir.join("trees.png")).unwrap(), PNG);
}

#[test]
fn redirect_is_followed_and_content_type_reported() {
    let base = image_server::start(vec![
        ("/old", Route::Redirect("/new.webp")),
        ("/new.webp", Route::image("image/webp", b"webp")),
    ]);
    let root = tempdir().unwrap();
    let dest = root.path().join("out.bin");

    let fetched = CurlFetcher::default()
        .fetch(&format!("{base}/old"), &dest)
        .unwrap();

    assert_eq!(fetched.content_type, "image/webp");
    assert_eq!(fetched.bytes, 4);
    assert_eq!(fs::read(&dest).unwrap(), b"webp");
}

#[test]
fn missing_content_type_is_empty() {
    let base = image_server::start(vec![(
        "/raw",
        Route::Ok {
            content_type: None,
            body: b"raw".to_vec(),
        },
    )]);
    let root = tempdir().unwrap();
    let dest = root.path().join("raw.png");

    let fetched = CurlFetcher::default()
        .fetch(&format!("{base}/raw"), &dest)
        .unwrap();
    assert_eq!(fetched.content_type, "");
}

#[test]
fn existing_destination_is_overwritten() {
    let base = image_server::start(vec![("/a.png", Route::image("image/png", b"new"))]);
    let root = tempdir().unwrap();
    let dest = root.path().join("a.png");
    fs::write(&dest, b"old contents").unwrap();

    CurlFetcher::default()
        .fetch(&format!("{base}/a.png"), &dest)
        .unwrap();
    assert_eq!(fs::read(&dest).unwrap(), b"new");
}

#[test]
fn slow_server_times_out() {
    let base = image_server::start(vec![("/slow.png", Route::Slow(Duration::from_secs(3)))]);
    let root = tempdir().unwrap();
    let dest = root.path().join("slow.png");
    let cfg = FetchConfig {
        timeout_secs: 1,
        ..FetchConfig::default()
    };

    let err = CurlFetcher::new(&cfg)
        .fetch(&format!("{base}/slow.png"), &dest)
        .unwrap_err();
    assert!(err.cause.is_timeout(), "unexpected cause: {}", err.cause);
    assert!(!dest.exists());
}

#[test]
fn refine_extension_uses_content_type() {
    let base = image_server::start(vec![
        ("/render?id=7", Route::image("image/gif", b"gif")),
    ]);
    let root = tempdir().unwrap();
    let opts = LocalizeOptions {
        refine_extension: true,
        ..options(root.path())
    };

    let input = json!([{"topic": "Animated", "image": format!("{base}/render?id=7")}]);
    let (_, output) = run(&opts, &input);

    assert_eq!(output[0]["image"], "/imgs/animated.gif");
    assert!(opts.outdir.join("animated.gif").exists());
    assert!(!opts.outdir.join("animated.png").exists());
}

#[test]
fn custom_outdir_name_is_used_in_paths() {
    let base = image_server::start(vec![("/a.svg", Route::image("image/svg+xml", b"<svg/>"))]);
    let root = tempdir().unwrap();
    let opts = LocalizeOptions {
        outdir: root.path().join("static").join("assets"),
        ..options(root.path())
    };

    let input = json!([{"topic": "Logo", "image": format!("{base}/a.svg")}]);
    let (_, output) = run(&opts, &input);

    assert_eq!(output[0]["image"], "/assets/logo.svg");
    assert!(opts.outdir.join("logo.svg").exists());
}
