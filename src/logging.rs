//! File-backed logger
//!
//! The terminal is in raw mode while the UI runs, so log records go to a
//! file instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Starts logging at `level` unless `RUST_LOG` says otherwise.
pub fn init(level: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    Builder::from_env(Env::default().default_filter_or(level))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("installing logger")?;
    Ok(())
}
