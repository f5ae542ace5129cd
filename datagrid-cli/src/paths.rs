//! Where the CLI keeps its column database and log files.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

/// Name of the log written by the current run.
const CURRENT_LOG: &str = "latest.log";

/// Archived logs kept after rotation.
const KEEP_ARCHIVED: usize = 10;

fn dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "datagrid", "datagrid")
}

/// Directory holding the column database.
pub fn data_dir() -> Option<PathBuf> {
    dirs().map(|d| d.data_dir().to_path_buf())
}

/// Directory holding logs.
pub fn cache_dir() -> Option<PathBuf> {
    dirs().map(|d| d.cache_dir().to_path_buf())
}

/// SQLite file with saved column visibility and order, shared by every
/// storage key.
pub fn columns_db() -> Option<PathBuf> {
    Some(data_dir()?.join("columns.db"))
}

/// Log file of this run.
pub fn log_file() -> Option<PathBuf> {
    Some(cache_dir()?.join(CURRENT_LOG))
}

/// Renames the previous run's log to a timestamped archive and prunes the
/// oldest archives.
pub fn rotate_logs() {
    if let Some(dir) = cache_dir() {
        rotate_in(&dir);
    }
}

fn rotate_in(dir: &Path) {
    let current = dir.join(CURRENT_LOG);
    if current.is_file() {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        if let Err(e) = fs::rename(&current, dir.join(format!("{stamp}.log"))) {
            eprintln!("could not archive {}: {}", current.display(), e);
        }
    }
    prune_archives(dir, KEEP_ARCHIVED);
}

/// Deletes archived logs beyond the newest `keep`. Archive names are
/// timestamps, so name order is age order.
fn prune_archives(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut archived: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "log")
                && path.file_name().is_some_and(|name| name != CURRENT_LOG)
        })
        .collect();
    archived.sort();

    let excess = archived.len().saturating_sub(keep);
    for path in &archived[..excess] {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("datagrid-paths-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = scratch("prune");
        for stamp in ["20240101_000000", "20240102_000000", "20240103_000000"] {
            fs::write(dir.join(format!("{stamp}.log")), "").unwrap();
        }
        fs::write(dir.join(CURRENT_LOG), "").unwrap();
        fs::write(dir.join("columns.db"), "").unwrap();

        prune_archives(&dir, 2);

        let mut left: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(
            left,
            vec!["20240102_000000.log", "20240103_000000.log", "columns.db", "latest.log"]
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rotate_archives_current_log() {
        let dir = scratch("rotate");
        fs::write(dir.join(CURRENT_LOG), "previous run").unwrap();

        rotate_in(&dir);

        assert!(!dir.join(CURRENT_LOG).exists());
        let archived = fs::read_dir(&dir).unwrap().flatten().count();
        assert_eq!(archived, 1);
        let _ = fs::remove_dir_all(&dir);
    }
}
