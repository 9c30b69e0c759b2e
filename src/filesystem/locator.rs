use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One candidate source file found in the save directory.
#[derive(Debug, Clone, Serialize)]
pub struct SaveFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
}

/// Scan `dir` for files with extension `ext`, newest-modified first. A
/// missing or unreadable directory yields an empty list, not an error.
pub fn scan_saves(dir: &Path, ext: &str) -> Vec<SaveFile> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "save directory is not readable");
            return Vec::new();
        }
    };

    let mut saves = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_file() {
            continue;
        }
        let modified = meta
            .modified()
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_owned(),
            None => continue,
        };
        saves.push(SaveFile {
            name,
            path,
            size: meta.len(),
            modified,
        });
    }

    saves.sort_by(|a, b| b.modified.cmp(&a.modified));
    saves
}
