//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "sheetgrid";
const APPLICATION: &str = "sheetgrid";

const LATEST_LOG: &str = "latest.log";

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 25;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Directory for persistent state (the login marker).
///
/// - Linux: `$XDG_DATA_HOME/sheetgrid` or `~/.local/share/sheetgrid`
/// - macOS: `~/Library/Application Support/dev.sheetgrid.sheetgrid`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Directory for logs.
///
/// - Linux: `$XDG_CACHE_HOME/sheetgrid` or `~/.cache/sheetgrid`
/// - macOS: `~/Library/Caches/dev.sheetgrid.sheetgrid`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path of the login marker file.
pub fn session_marker() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("session"))
}

/// Path of the current log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LATEST_LOG))
}

/// Archives `latest.log` under a timestamped name and prunes old logs.
///
/// Call this at startup before creating the new log file.
pub fn rotate_logs() {
    if let Some(cache) = cache_dir() {
        rotate_logs_in(&cache);
    }
}

fn rotate_logs_in(dir: &Path) {
    let latest = dir.join(LATEST_LOG);
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S%.3f");
        let _ = fs::rename(&latest, dir.join(format!("{}.log", timestamp)));
    }
    cleanup_old_logs(dir);
}

/// Removes archived logs beyond the newest `MAX_OLD_LOGS`.
fn cleanup_old_logs(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();

    // Oldest first; names are timestamps, so they break mtime ties.
    logs.sort_by_key(|e| (e.metadata().and_then(|m| m.modified()).ok(), e.file_name()));

    if logs.len() > MAX_OLD_LOGS {
        for entry in logs.iter().take(logs.len() - MAX_OLD_LOGS) {
            let _ = fs::remove_file(entry.path());
        }
    }
}
