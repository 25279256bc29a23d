//! File logging for the TUI. The terminal belongs to ratatui, so log lines
//! go to a file instead of stderr.
//!
//! Filter priority, highest first: `TYPEDEX_LOG`, `RUST_LOG`, then the
//! `--verbose` flag (`debug` for this crate) or `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TYPEDEX_LOG";
const LOG_DIR: &str = "typedex";
const LOG_FILE: &str = "typedex.log";

/// `<cache dir>/typedex/typedex.log`, or `None` when the platform has no
/// cache directory.
pub fn default_log_path() -> Option<PathBuf> {
    dirs_next::cache_dir().map(|dir| dir.join(LOG_DIR).join(LOG_FILE))
}

pub fn resolve_log_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(default_log_path)
}

/// Directive used when neither env var is set.
pub fn default_directive(verbose: bool) -> String {
    if verbose {
        format!("info,{}=debug", env!("CARGO_CRATE_NAME"))
    } else {
        "info".to_string()
    }
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(default_directive(verbose)).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber writing to `log_file` (or the default
/// location). Returns the path in use.
pub fn init(log_file: Option<&Path>, verbose: bool) -> io::Result<PathBuf> {
    let path = resolve_log_path(log_file).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no cache directory for the log file")
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);
    tracing_subscriber::registry()
        .with(build_env_filter(verbose))
        .with(fmt_layer)
        .try_init()
        .map_err(|err| io::Error::other(err.to_string()))?;
    Ok(path)
}
