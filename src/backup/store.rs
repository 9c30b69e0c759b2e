use crate::backup::index::{BackupIndex, INDEX_FILE};
use crate::backup::record::{
    BackupDetails, BackupMeta, BackupRow, BackupSummary, MetadataPatch,
};
use crate::filesystem::fsops::{atomic_write, copy_with_mtime};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// Metadata document name inside each backup directory.
pub const META_FILE: &str = "meta.json";

/// Suffix of a staged backup directory that has not been committed yet.
const PARTIAL_SUFFIX: &str = ".tmp";

/// Manages every retained copy under one root directory: creation, restore,
/// deletion, metadata edits, retention eviction, and the index document that
/// tracks membership. One instance owns one root; all state is injected at
/// construction.
pub struct BackupStore {
    root: PathBuf,
    limit: usize,
    index: Mutex<BackupIndex>,
}

impl BackupStore {
    /// Open (or initialize) a store rooted at `root`, retaining at most
    /// `limit` backups per save. Loads the index and sweeps any staged
    /// directories left behind by an interrupted create.
    pub fn open(root: impl Into<PathBuf>, limit: usize) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create backup root {}", root.display()))?;
        let index = BackupIndex::load(&root.join(INDEX_FILE));
        let store = Self {
            root,
            limit: limit.max(1),
            index: Mutex::new(index),
        };
        store.sweep_partials();
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn locked(&self) -> MutexGuard<'_, BackupIndex> {
        self.index.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Back up `source` under a fresh id, returning the id. The payload and
    /// metadata are staged into a `.tmp` directory and renamed into place
    /// before the index is touched, so the index never references a
    /// half-written backup.
    pub fn create(&self, source: &Path, description: &str, tags: &[String]) -> Result<String> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("source path has no file name: {}", source.display()))?;
        let save_name = source
            .file_stem()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("source path has no file stem: {}", source.display()))?;
        let source_meta = fs::metadata(source)
            .with_context(|| format!("Failed to read source file {}", source.display()))?;
        if !source_meta.is_file() {
            bail!("source is not a regular file: {}", source.display());
        }

        let now = Local::now();
        let mut index = self.locked();
        let id = unique_id(&index, &save_name, &now);

        let final_dir = self.root.join(&id);
        let staging_dir = self.root.join(format!("{id}{PARTIAL_SUFFIX}"));
        let staged = (|| -> Result<u64> {
            fs::create_dir_all(&staging_dir)?;
            let size = copy_with_mtime(source, &staging_dir.join(&file_name))?;
            let meta = BackupMeta {
                original_file: source.to_path_buf(),
                backup_time: now,
                description: description.to_owned(),
                tags: tags.to_vec(),
                game_date: String::new(),
                size,
            };
            atomic_write(
                &staging_dir.join(META_FILE),
                serde_json::to_string_pretty(&meta)?.as_bytes(),
            )?;
            fs::rename(&staging_dir, &final_dir)?;
            Ok(size)
        })();
        if let Err(e) = staged {
            let _ = fs::remove_dir_all(&staging_dir);
            return Err(e).with_context(|| format!("Failed to stage backup of {}", source.display()));
        }

        index.push(
            &save_name,
            BackupSummary {
                id: id.clone(),
                time: now,
                description: description.to_owned(),
                tags: tags.to_vec(),
            },
        );

        // Retention: a single oldest eviction per create, even when a lowered
        // limit leaves the list more than one over.
        if let Some(entries) = index.entries_mut(&save_name) {
            if entries.len() > self.limit {
                let oldest = entries
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, s)| s.time)
                    .map(|(pos, _)| pos)
                    .unwrap_or(0);
                let evicted = entries.remove(oldest);
                let dir = self.root.join(&evicted.id);
                if let Err(e) = fs::remove_dir_all(&dir) {
                    warn!(id = %evicted.id, error = %e, "failed to remove evicted backup directory");
                }
                info!(id = %evicted.id, save = %save_name, "evicted oldest backup over retention limit");
            }
        }

        if let Err(e) = index.save(&self.index_path()) {
            // The index write is the commit point; without it the new copy
            // must not be registered.
            index.remove(&save_name, &id);
            let _ = fs::remove_dir_all(&final_dir);
            return Err(e);
        }
        info!(id = %id, save = %save_name, size = source_meta.len(), "created backup");
        Ok(id)
    }

    /// Copy the backup's payload back over the live save file, preserving any
    /// existing live file as a timestamped `.bak` sibling first. The target
    /// is recomputed from the recorded original path on every call. Returns
    /// the target path.
    pub fn restore(&self, id: &str) -> Result<PathBuf> {
        {
            let index = self.locked();
            if !index.is_referenced(id) {
                bail!("no backup with id '{id}'");
            }
        }

        let meta = self.read_meta(id)?;
        let file_name = meta
            .original_file
            .file_name()
            .ok_or_else(|| anyhow!("backup '{id}' records an original path with no file name"))?;
        let target_dir = meta
            .original_file
            .parent()
            .ok_or_else(|| anyhow!("backup '{id}' records an original path with no parent"))?;
        let payload = self.root.join(id).join(file_name);
        let target = target_dir.join(file_name);

        if target.exists() {
            let safety = target_dir.join(format!(
                "{}.{}.bak",
                file_name.to_string_lossy(),
                stamp(&Local::now())
            ));
            copy_with_mtime(&target, &safety)
                .with_context(|| format!("Failed to set aside live file {}", target.display()))?;
            info!(path = %safety.display(), "preserved live file before restore");
        }

        copy_with_mtime(&payload, &target)
            .with_context(|| format!("Failed to restore backup '{id}'"))?;
        info!(id, target = %target.display(), "restored backup");
        Ok(target)
    }

    /// Delete a backup by id. A directory that is already gone still drops
    /// the index entry and counts as success; any other removal failure
    /// leaves the index untouched.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut index = self.locked();
        let save_name = index
            .locate(id)
            .map(|(save, _)| save.to_owned())
            .ok_or_else(|| anyhow!("no backup with id '{id}'"))?;

        let dir = self.root.join(id);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(id, "backup directory already absent, removing index entry");
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to remove backup directory {}", dir.display()));
            }
        }

        index.remove(&save_name, id);
        index.save(&self.index_path())?;
        info!(id, save = %save_name, "deleted backup");
        Ok(())
    }

    /// Apply `patch` to a backup's metadata. Supplied fields overwrite, even
    /// with empty values; omitted fields are left alone. `description` and
    /// `tags` also update the index summary; `game_date` lives only in the
    /// metadata document.
    pub fn update_metadata(&self, id: &str, patch: MetadataPatch) -> Result<()> {
        let mut index = self.locked();
        let (save_name, pos) = index
            .locate(id)
            .map(|(save, pos)| (save.to_owned(), pos))
            .ok_or_else(|| anyhow!("no backup with id '{id}'"))?;

        if let Some(entries) = index.entries_mut(&save_name) {
            let summary = &mut entries[pos];
            if let Some(description) = &patch.description {
                summary.description = description.clone();
            }
            if let Some(tags) = &patch.tags {
                summary.tags = tags.clone();
            }
        }

        match self.read_meta(id) {
            Ok(mut meta) => {
                if let Some(description) = patch.description {
                    meta.description = description;
                }
                if let Some(tags) = patch.tags {
                    meta.tags = tags;
                }
                if let Some(game_date) = patch.game_date {
                    meta.game_date = game_date;
                }
                atomic_write(
                    &self.root.join(id).join(META_FILE),
                    serde_json::to_string_pretty(&meta)?.as_bytes(),
                )
                .with_context(|| format!("Failed to rewrite metadata for backup '{id}'"))?;
            }
            Err(e) => {
                warn!(id, error = %format!("{e:#}"), "metadata document unreadable, updating index only");
            }
        }

        index.save(&self.index_path())?;
        info!(id, "updated backup metadata");
        Ok(())
    }

    /// Backups of one save, newest first, enriched from each metadata
    /// document where readable. An unreadable document degrades that one row
    /// to its index summary instead of failing the listing.
    pub fn list_for_save(&self, save_name: &str) -> Vec<BackupDetails> {
        let mut rows: Vec<BackupSummary> = {
            let index = self.locked();
            index.entries(save_name).to_vec()
        };
        rows.sort_by(|a, b| b.time.cmp(&a.time));
        rows.into_iter()
            .map(|s| match self.read_meta(&s.id) {
                Ok(meta) => BackupDetails {
                    id: s.id,
                    time: s.time,
                    description: meta.description,
                    tags: s.tags,
                    game_date: Some(meta.game_date),
                    size: Some(meta.size),
                },
                Err(e) => {
                    warn!(id = %s.id, error = %format!("{e:#}"), "metadata unreadable, listing index summary");
                    BackupDetails {
                        id: s.id,
                        time: s.time,
                        description: s.description,
                        tags: s.tags,
                        game_date: None,
                        size: None,
                    }
                }
            })
            .collect()
    }

    /// Every backup across every save, newest first, from the index summaries
    /// alone (no per-record metadata reads).
    pub fn list_all(&self) -> Vec<BackupRow> {
        let index = self.locked();
        let mut rows: Vec<BackupRow> = index
            .iter()
            .flat_map(|(save, entries)| {
                entries.iter().map(move |s| BackupRow {
                    save_name: save.clone(),
                    id: s.id.clone(),
                    time: s.time,
                    description: s.description.clone(),
                    tags: s.tags.clone(),
                })
            })
            .collect();
        drop(index);
        rows.sort_by(|a, b| b.time.cmp(&a.time));
        rows
    }

    fn read_meta(&self, id: &str) -> Result<BackupMeta> {
        let path = self.root.join(id).join(META_FILE);
        let body = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&body).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Startup reconciliation: staged `.tmp` directories are leftovers of an
    /// interrupted create and are removed. Committed directories the index
    /// does not reference are reported, never deleted.
    fn sweep_partials(&self) {
        let index = self.locked();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.ends_with(PARTIAL_SUFFIX) {
                match fs::remove_dir_all(&path) {
                    Ok(()) => info!(dir = %path.display(), "removed staged backup leftover"),
                    Err(e) => warn!(dir = %path.display(), error = %e, "failed to remove staged leftover"),
                }
            } else if !index.is_referenced(name) {
                warn!(dir = %path.display(), "backup directory not referenced by the index");
            }
        }
    }
}

/// Second-resolution timestamp token used in backup ids and safety-copy names.
fn stamp(t: &DateTime<Local>) -> String {
    t.format("%Y%m%d_%H%M%S").to_string()
}

/// `{save}_{stamp}`, suffixed with `_2`, `_3`, ... when a same-second create
/// would otherwise collide with an existing id.
fn unique_id(index: &BackupIndex, save_name: &str, now: &DateTime<Local>) -> String {
    let base = format!("{save_name}_{}", stamp(now));
    if !index.contains_id(save_name, &base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if !index.contains_id(save_name, &candidate) {
            return candidate;
        }
        n += 1;
    }
}
