use crate::backup::record::BackupSummary;
use crate::filesystem::fsops::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::error;

/// File name of the index document at the store root.
pub const INDEX_FILE: &str = "backup_index.json";

/// On-disk index: save identity -> insertion-ordered backup summaries.
/// Membership here is authoritative; ordering for display is recomputed at
/// query time.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupIndex {
    saves: BTreeMap<String, Vec<BackupSummary>>,
}

impl BackupIndex {
    /// Load the index document from `path`. A missing file yields an empty
    /// index; a malformed one is logged and also yields an empty index, so a
    /// bad document never takes the whole store down.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(index) => index,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "backup index is malformed, starting empty");
                    Self::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "backup index is unreadable, starting empty");
                Self::default()
            }
        }
    }

    /// Serialize and persist the whole index to `path` (full overwrite,
    /// temp-file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self).context("Failed to serialize backup index")?;
        atomic_write(path, body.as_bytes()).context("Failed to persist backup index")
    }

    pub fn entries(&self, save_name: &str) -> &[BackupSummary] {
        self.saves.get(save_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entries_mut(&mut self, save_name: &str) -> Option<&mut Vec<BackupSummary>> {
        self.saves.get_mut(save_name)
    }

    pub fn push(&mut self, save_name: &str, summary: BackupSummary) {
        self.saves.entry(save_name.to_owned()).or_default().push(summary);
    }

    pub fn contains_id(&self, save_name: &str, id: &str) -> bool {
        self.entries(save_name).iter().any(|s| s.id == id)
    }

    /// Linear scan across every save for the one owning `id`.
    pub fn locate(&self, id: &str) -> Option<(&str, usize)> {
        self.saves.iter().find_map(|(save, entries)| {
            entries
                .iter()
                .position(|s| s.id == id)
                .map(|pos| (save.as_str(), pos))
        })
    }

    pub fn is_referenced(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    /// Remove `id` from `save_name`'s list, dropping the save key entirely
    /// once its list is empty.
    pub fn remove(&mut self, save_name: &str, id: &str) {
        if let Some(entries) = self.saves.get_mut(save_name) {
            entries.retain(|s| s.id != id);
            if entries.is_empty() {
                self.saves.remove(save_name);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<BackupSummary>)> {
        self.saves.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.saves.is_empty()
    }
}
