use anyhow::{Context, Result};
use ftlog::{
    appender::{FileAppender, Period},
    LevelFilter, LoggerGuard,
};
use std::path::{Path, PathBuf};

/// Configures the logger.
///
/// Logs go to a file because the terminal is the drawing surface.
///
/// # Errors
///
/// - If the logs directory could not be created.
/// - If the logger could not be initialized.
pub fn configure_logger(logs_dir: &Path, file_name: &str) -> Result<(LoggerGuard, PathBuf)> {
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)
            .with_context(|| format!("could not create {}", logs_dir.display()))?;
    }
    let log_path = logs_dir.join(file_name);

    let writer = FileAppender::builder().path(&log_path).rotate(Period::Day).build();

    let err_stem = log_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("cubefield");
    let err_path = log_path.with_file_name(format!("{err_stem}-err.log"));

    let guard = ftlog::Builder::new()
        .max_log_level(LevelFilter::Info)
        .root(writer)
        // appender failures go to their own file
        .filter("ftlog::appender", "ftlog-appender", LevelFilter::Warn)
        .appender("ftlog-appender", FileAppender::new(err_path))
        .try_init()
        .map_err(|e| anyhow::anyhow!("could not initialize logging: {e}"))?;

    Ok((guard, log_path))
}
