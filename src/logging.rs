use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

pub const LOG_FILTER_ENV: &str = "ROSTER_LOG";

/// The TUI owns stdout/stderr, so its log lines go to a file instead.
pub fn init_file_logger(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    Builder::from_env(Env::default().filter_or(LOG_FILTER_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .context("install logger")?;
    Ok(())
}

pub fn init_stderr_logger() {
    let _ = Builder::from_env(Env::default().filter_or(LOG_FILTER_ENV, "info"))
        .format_timestamp_secs()
        .try_init();
}
