//! Logging for llamadesk.
use anyhow::Context;
use llamadesk_core::get_data_dir;
use std::io::LineWriter;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::OffsetTime;

/// Log files larger than this are rotated to `llamadesk.log.old` on startup.
const MAX_LOG_SIZE: u64 = 100 * 1024;

/// Moves `log_path` aside when it grew beyond `MAX_LOG_SIZE`, keeping one backup.
fn rotate_log(log_path: &Path) -> std::io::Result<()> {
    if !log_path.exists() {
        return Ok(());
    }
    let metadata = std::fs::metadata(log_path)?;
    if metadata.len() > MAX_LOG_SIZE {
        let backup_path = log_path.with_extension("log.old");
        if backup_path.exists() {
            std::fs::remove_file(&backup_path)?;
        }
        std::fs::rename(log_path, backup_path)?;
    }
    Ok(())
}

/// Initializes file based logging under the data directory.
///
/// Writes to `<data_dir>/llamadesk.log`, rotating it first if it is over 100KB.
/// The `llamadesk` crates log at DEBUG, reqwest and rustyline at INFO.
///
/// # Errors
///
/// Fails when the data directory or log file cannot be created, or when the
/// local time offset cannot be determined.
pub fn setup_logging() -> anyhow::Result<()> {
    let data_dir = get_data_dir().context("Failed to get data directory")?;
    let log_path = data_dir.join("llamadesk.log");
    rotate_log(&log_path).context("Failed to rotate log file")?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Ensure the logs are flushed after every line
    let writer = Mutex::new(LineWriter::new(log_file));

    tracing_subscriber::fmt()
        .with_env_filter("llamadesk=debug,llamadesk_core=debug,llamadesk_tools_meme=debug,reqwest=info,rustyline=info")
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(OffsetTime::local_rfc_3339()?)
        .init();
    Ok(())
}
