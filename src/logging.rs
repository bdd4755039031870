use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};
use std::path::Path;

const MAX_LOG_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Starts a rolling file logger under `log_dir`. The terminal runs in
/// raw mode, so nothing may ever log to stdout or stderr. The returned
/// handle must stay alive for the lifetime of the process.
pub fn init(log_dir: &Path) -> Result<LoggerHandle> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating {}", log_dir.display()))?;
    let handle = Logger::try_with_env_or_str("info")
        .context("bad log spec")?
        .log_to_file(FileSpec::default().directory(log_dir).basename("dialdash"))
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .append()
        .start()
        .context("starting logger")?;
    Ok(handle)
}
