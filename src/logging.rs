use log::{info, LevelFilter};
use std::path::Path;

use crate::Result;

pub const LOG_FILE: &str = "deskband.log";

pub fn init_console(level: LevelFilter) {
    simple_logging::log_to_stderr(level);
}

/// File logging. A band runs inside explorer.exe, which has no console.
pub fn init_file(path: &Path, level: LevelFilter) -> Result<()> {
    simple_logging::log_to_file(path, level)?;
    info!("Logging to {:?} at {level}", path);
    Ok(())
}

/// Logs to `%LOCALAPPDATA%\deskband\deskband.log`.
#[cfg(windows)]
pub fn init_appdata(level: LevelFilter) -> Result<()> {
    let mut path = crate::win32::get_local_appdata_path()?;
    path.push(env!("CARGO_PKG_NAME"));
    std::fs::create_dir_all(&path)?;
    path.push(LOG_FILE);
    init_file(&path, level)
}
