use clap::{Parser, Subcommand};

const SAVEKEEP_LONG_VERSION: &str = concat!(
"version: ", env!("CARGO_PKG_VERSION"), "\n",
"git sha: ", env!("SAVEKEEP_GIT_SHA"), "\n",
"build time (UTC): ", env!("SAVEKEEP_BUILD_TIME"), "\n",
"target: ", env!("SAVEKEEP_TARGET")
);

#[derive(Parser)]
#[command(
    name = "savekeep",
    version = env!("CARGO_PKG_VERSION"),
    long_version = SAVEKEEP_LONG_VERSION,
    about = " 🗃️ Savekeep — Save File Backup Manager"
)]
pub struct Cli {
    /// Backup root directory override
    #[arg(long, global = true)]
    pub backup_dir: Option<String>,
    /// Save directory override
    #[arg(long, global = true)]
    pub save_dir: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List save files found in the save directory, newest first
    Saves {
        /// Output JSON array (machine-readable)
        #[arg(long)]
        json: bool,
    },
    /// Create a backup of a save file
    Create {
        /// Save file to back up: a path, or a bare name inside the save directory
        file: String,
        /// Backup description
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List backups, newest first
    List {
        /// Limit to one save (name without extension); enriches rows from each backup's metadata
        #[arg(long)]
        save: Option<String>,
        /// Output JSON array (machine-readable)
        #[arg(long)]
        json: bool,
    },
    /// Restore a backup over the live save file
    Restore {
        /// Backup id
        id: String,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Delete a backup by id
    Rm {
        /// Backup id
        id: String,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Edit a backup's description, tags, or game date
    Edit {
        /// Backup id
        id: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags; pass "" to clear
        #[arg(long)]
        tags: Option<String>,
        /// New in-game date label
        #[arg(long)]
        game_date: Option<String>,
    },
    /// Show the effective configuration, or persist new values
    Config {
        /// Persist a backup root directory
        #[arg(long)]
        backup_dir: Option<String>,
        /// Persist a save directory
        #[arg(long)]
        save_dir: Option<String>,
        /// Persist a per-save retention limit
        #[arg(long)]
        max_backups: Option<usize>,
        /// Persist a save file extension
        #[arg(long)]
        save_ext: Option<String>,
    },
}
