//! Logging init: file under the XDG state dir, or stderr when that fails.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,roster=debug,roster_core=debug,roster_provider=debug";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to this file, creating it and its parent directories.
    File(PathBuf),
    Stderr,
}

/// `~/.local/state/roster/roster.log`
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("roster")?;
    Ok(xdg_dirs.get_state_home().join("roster.log"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

/// `RUST_LOG`-style directives, or the crate defaults when absent or unparsable.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `target`. Fails if the log file
/// cannot be opened or a subscriber is already installed.
pub fn init(target: &LogTarget) -> Result<()> {
    let writer = match target {
        LogTarget::File(path) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
        LogTarget::Stderr => BoxMakeWriter::new(io::stderr),
    };
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(directives.as_deref()))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("logging already initialized: {e}"))?;
    Ok(())
}

/// Log to the default file. Returns Err (e.g. state dir unwritable) so the
/// caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<PathBuf> {
    let path = default_log_path()?;
    init(&LogTarget::File(path.clone()))?;
    tracing::info!("roster logging initialized at {}", path.display());
    Ok(path)
}

pub fn init_logging_stderr() {
    let _ = init(&LogTarget::Stderr);
}
