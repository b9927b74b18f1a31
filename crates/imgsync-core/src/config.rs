use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User agent sent with every image request unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; CourseworkImageFetcher/1.0)";

/// HTTP fetch parameters (`[fetch]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Value of the `User-Agent` request header.
    pub user_agent: String,
    /// Whole-request timeout in seconds. Values below 1 are raised to 1.
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds. Values below 1 are raised to 1.
    pub connect_timeout_secs: u64,
    /// Maximum number of redirects followed per request.
    pub max_redirections: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 20,
            connect_timeout_secs: 10,
            max_redirections: 10,
        }
    }
}

/// Curl reads a zero timeout as "wait forever".
const MIN_TIMEOUT_SECS: u64 = 1;

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(MIN_TIMEOUT_SECS))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(MIN_TIMEOUT_SECS))
    }
}

/// Default manifest and image locations (`[paths]` section), relative to the run root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Input manifest.
    pub input: PathBuf,
    /// Rewritten output manifest.
    pub output: PathBuf,
    /// Directory downloaded images are written to.
    pub outdir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("seed.lessons.json"),
            output: PathBuf::from("seed.lessons.local.json"),
            outdir: PathBuf::from("imgs"),
        }
    }
}

impl PathsConfig {
    /// Resolves the configured paths against `root`. Absolute entries are kept as-is.
    pub fn resolve(&self, root: &Path) -> (PathBuf, PathBuf, PathBuf) {
        (
            root.join(&self.input),
            root.join(&self.output),
            root.join(&self.outdir),
        )
    }
}

/// Global configuration loaded from `~/.config/imgsync/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImgsyncConfig {
    /// Rename a download after the fact when the URL gave no extension hint
    /// and the response content type points at a different one.
    #[serde(default)]
    pub refine_extension: bool,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path`.
pub fn load_from(path: &Path) -> Result<ImgsyncConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: ImgsyncConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
///
/// A config directory that cannot be located or written is not fatal: the
/// defaults are used. A config file that exists but does not parse is an error.
pub fn load_or_init() -> Result<ImgsyncConfig> {
    let path = match config_path() {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("config dir unavailable, using defaults: {:#}", e);
            return Ok(ImgsyncConfig::default());
        }
    };
    if path.exists() {
        return load_from(&path);
    }

    let default_cfg = ImgsyncConfig::default();
    if let Err(e) = write_default(&path, &default_cfg) {
        tracing::warn!("could not create {}: {:#}", path.display(), e);
    } else {
        tracing::info!("created default config at {}", path.display());
    }
    Ok(default_cfg)
}

fn write_default(path: &Path, cfg: &ImgsyncConfig) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}
