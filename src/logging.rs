use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Send `tracing` output to `file`. The terminal belongs to the UI, so
/// without a file logging is switched off.
pub fn init(level: &str, file: Option<&Path>) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let Some(path) = file else {
            return Ok(());
        };
        let writer = open_log_file(path)?;
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(Mutex::new(writer))
            .try_init()
            .map_err(|err| anyhow::anyhow!("install log subscriber: {err}"))?;
        Ok(())
    })
    .map(|_| ())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}
