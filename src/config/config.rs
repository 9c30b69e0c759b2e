use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_backups must be at least 1 (got {0})")]
    InvalidRetention(usize),
}

/// Per-save retention limit used when neither the environment nor the config
/// file supplies one.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// Shape of `config.toml`; every key optional.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub backup_dir: Option<String>,
    pub save_dir: Option<String>,
    pub max_backups: Option<usize>,
    pub save_ext: Option<String>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub backup_dir: PathBuf,
    pub save_dir: PathBuf,
    pub max_backups: usize,
    pub save_ext: String,
}

impl Config {
    /// Resolve configuration with precedence CLI > environment > config file
    /// > built-in default, per key.
    pub fn create(
        backup_dir: Option<PathBuf>,
        save_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let file_cfg = load_file_config();

        let backup_dir = backup_dir
            .or_else(|| env::var("SAVEKEEP_BACKUP_DIR").ok().map(PathBuf::from))
            .or_else(|| file_cfg.backup_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_backup_dir);

        let save_dir = save_dir
            .or_else(|| env::var("SAVEKEEP_SAVE_DIR").ok().map(PathBuf::from))
            .or_else(|| file_cfg.save_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_save_dir);

        let max_backups = env::var("SAVEKEEP_MAX_BACKUPS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .or(file_cfg.max_backups)
            .unwrap_or(DEFAULT_MAX_BACKUPS);
        if max_backups == 0 {
            return Err(ConfigError::InvalidRetention(max_backups));
        }

        let save_ext = env::var("SAVEKEEP_SAVE_EXT")
            .ok()
            .or(file_cfg.save_ext)
            .unwrap_or_else(|| "eu4".to_string());

        Ok(Config {
            backup_dir,
            save_dir,
            max_backups,
            save_ext,
        })
    }
}

fn load_file_config() -> FileConfig {
    let (_, cfg) = load_file_config_with_path();
    cfg
}

pub fn load_file_config_with_path() -> (PathBuf, FileConfig) {
    // Allow tests/users to override config dir via SAVEKEEP_CONFIG_DIR; else
    // use the platform default
    let cfg_dir = if let Ok(p) = env::var("SAVEKEEP_CONFIG_DIR") {
        PathBuf::from(p)
    } else {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
    };
    let path = cfg_dir.join("savekeep").join("config.toml");
    let cfg = match fs::read_to_string(&path) {
        Ok(s) => toml::from_str::<FileConfig>(&s).unwrap_or_default(),
        Err(_) => FileConfig::default(),
    };
    (path, cfg)
}

pub fn save_file_config(path: &Path, cfg: &FileConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let s = toml::to_string_pretty(cfg).map_err(std::io::Error::other)?;
    fs::write(path, s)
}

fn default_backup_dir() -> PathBuf {
    // Prefer platform data_dir, allow override via SAVEKEEP_DATA_DIR,
    // fallback to ~/.savekeep/backups
    if let Ok(base) = env::var("SAVEKEEP_DATA_DIR") {
        return PathBuf::from(base).join("savekeep").join("backups");
    }
    if let Some(mut p) = dirs::data_dir() {
        p.push("savekeep");
        p.push("backups");
        return p;
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(&home).join(".savekeep").join("backups")
}

fn default_save_dir() -> PathBuf {
    // The documents layout EU4 writes saves into
    let docs = dirs::document_dir().unwrap_or_else(|| {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(&home).join("Documents")
    });
    docs.join("Paradox Interactive")
        .join("Europa Universalis IV")
        .join("save games")
}
