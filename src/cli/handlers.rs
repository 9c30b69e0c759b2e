use crate::backup::record::MetadataPatch;
use crate::backup::store::BackupStore;
use crate::config::config::Config;
use crate::filesystem::locator::scan_saves;
use anyhow::{anyhow, Result};
use inquire::Confirm;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::spawn_blocking;

pub struct App<'a> {
    config: &'a Config,
    store: Arc<BackupStore>,
}

impl<'a> App<'a> {
    pub fn create(config: &'a Config) -> Result<Self> {
        let store = Arc::new(BackupStore::open(
            config.backup_dir.clone(),
            config.max_backups,
        )?);
        Ok(App { config, store })
    }

    pub async fn handle_saves(&self, json_mode: bool) -> Result<()> {
        let dir = self.config.save_dir.clone();
        let ext = self.config.save_ext.clone();
        let saves = spawn_blocking(move || scan_saves(&dir, &ext))
            .await
            .map_err(|_| anyhow!("task join error"))?;

        if json_mode {
            println!("{}", serde_json::to_string_pretty(&saves)?);
            return Ok(());
        }
        if saves.is_empty() {
            println!("(no save files in {})", self.config.save_dir.display());
            return Ok(());
        }
        for s in saves {
            println!(
                "{}\t{}\t{}",
                s.name,
                format_size(s.size),
                s.modified.format("%Y-%m-%d %H:%M:%S")
            );
        }
        Ok(())
    }

    pub async fn handle_create(
        &self,
        file: String,
        description: String,
        tags: Option<String>,
    ) -> Result<()> {
        let source = self.resolve_source(&file);
        let tags = tags.as_deref().map(split_tags).unwrap_or_default();
        let store = self.store.clone();
        let id = spawn_blocking(move || store.create(&source, &description, &tags))
            .await
            .map_err(|_| anyhow!("task join error"))??;
        println!("✅ Backup created: {id}");
        Ok(())
    }

    pub async fn handle_list(&self, save: Option<String>, json_mode: bool) -> Result<()> {
        match save {
            Some(save_name) => {
                let store = self.store.clone();
                let name = save_name.clone();
                let rows = spawn_blocking(move || store.list_for_save(&name))
                    .await
                    .map_err(|_| anyhow!("task join error"))?;
                if json_mode {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                    return Ok(());
                }
                if rows.is_empty() {
                    println!("(no backups for '{save_name}')");
                    return Ok(());
                }
                for r in rows {
                    let size = r.size.map(format_size).unwrap_or_else(|| "?".to_string());
                    let game_date = r.game_date.unwrap_or_default();
                    println!(
                        "{}\t{}\t{}\t{}\t{}\t{}",
                        r.id,
                        r.time.format("%Y-%m-%d %H:%M:%S"),
                        size,
                        game_date,
                        r.tags.join(","),
                        r.description
                    );
                }
            }
            None => {
                let store = self.store.clone();
                let rows = spawn_blocking(move || store.list_all())
                    .await
                    .map_err(|_| anyhow!("task join error"))?;
                if json_mode {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                    return Ok(());
                }
                if rows.is_empty() {
                    println!("(no backups)");
                    return Ok(());
                }
                for r in rows {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        r.save_name,
                        r.id,
                        r.time.format("%Y-%m-%d %H:%M:%S"),
                        r.tags.join(","),
                        r.description
                    );
                }
            }
        }
        Ok(())
    }

    pub async fn handle_restore(&self, id: String, yes: bool) -> Result<()> {
        if !yes {
            let msg = format!("Overwrite the live save file with backup '{id}' ?");
            let proceed = Confirm::new(&msg).with_default(false).prompt()?;
            if !proceed {
                println!("❎ Restore cancelled.");
                return Ok(());
            }
        }

        let store = self.store.clone();
        let id_owned = id.clone();
        let target = spawn_blocking(move || store.restore(&id_owned))
            .await
            .map_err(|_| anyhow!("task join error"))??;
        println!("✅ Restored '{id}' to {}", target.display());
        Ok(())
    }

    pub async fn handle_rm(&self, id: String, yes: bool) -> Result<()> {
        if !yes {
            let msg = format!("Delete backup '{id}' ?");
            let proceed = Confirm::new(&msg).with_default(false).prompt()?;
            if !proceed {
                println!("❎ Deletion cancelled.");
                return Ok(());
            }
        }

        let store = self.store.clone();
        let id_owned = id.clone();
        spawn_blocking(move || store.delete(&id_owned))
            .await
            .map_err(|_| anyhow!("task join error"))??;
        println!("🗑️ Backup '{id}' removed.");
        Ok(())
    }

    pub async fn handle_edit(
        &self,
        id: String,
        description: Option<String>,
        tags: Option<String>,
        game_date: Option<String>,
    ) -> Result<()> {
        let patch = MetadataPatch {
            description,
            tags: tags.as_deref().map(split_tags),
            game_date,
        };
        if patch.description.is_none() && patch.tags.is_none() && patch.game_date.is_none() {
            println!("❎ Nothing to update.");
            return Ok(());
        }

        let store = self.store.clone();
        let id_owned = id.clone();
        spawn_blocking(move || store.update_metadata(&id_owned, patch))
            .await
            .map_err(|_| anyhow!("task join error"))??;
        println!("✅ Backup '{id}' updated.");
        Ok(())
    }

    /// A bare name that does not resolve as a path is tried inside the
    /// configured save directory.
    fn resolve_source(&self, file: &str) -> PathBuf {
        let direct = PathBuf::from(file);
        if direct.exists() || direct.components().count() > 1 {
            return direct;
        }
        self.config.save_dir.join(file)
    }
}

/// Comma-separated tags; whitespace trimmed, empty pieces dropped, order and
/// duplicates preserved. An empty string yields an empty list.
pub fn split_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// B/KB/MB/GB with two decimals past the first unit.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.2} KB", b / KB)
    } else if b < GB {
        format!("{:.2} MB", b / MB)
    } else {
        format!("{:.2} GB", b / GB)
    }
}
