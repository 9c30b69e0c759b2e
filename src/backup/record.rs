use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lightweight index row for one retained backup. This is what the index
/// document persists; the full metadata lives in the backup directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSummary {
    pub id: String,
    pub time: DateTime<Local>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Per-backup metadata document (`meta.json` inside the backup directory).
/// `size` is recorded once at copy time and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMeta {
    pub original_file: PathBuf,
    pub backup_time: DateTime<Local>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub game_date: String,
    pub size: u64,
}

/// One row of a per-save listing. Enrichment fields are `None` when the
/// metadata document could not be read and the index summary stands alone.
#[derive(Debug, Clone, Serialize)]
pub struct BackupDetails {
    pub id: String,
    pub time: DateTime<Local>,
    pub description: String,
    pub tags: Vec<String>,
    pub game_date: Option<String>,
    pub size: Option<u64>,
}

/// One row of the flattened all-saves listing, annotated with the owning save.
#[derive(Debug, Clone, Serialize)]
pub struct BackupRow {
    pub save_name: String,
    pub id: String,
    pub time: DateTime<Local>,
    pub description: String,
    pub tags: Vec<String>,
}

/// Field-wise patch for `BackupStore::update_metadata`. `None` leaves a field
/// untouched; supplying an empty value overwrites with that empty value.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub game_date: Option<String>,
}
