#![allow(clippy::module_inception)]
use crate::cli::cli::{Cli, Commands};
use crate::cli::handlers::App;
use crate::config::config::{load_file_config_with_path, save_file_config, Config};
use clap::Parser;
use std::path::PathBuf;

pub mod cli;
pub mod handlers;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::create(
        cli.backup_dir.map(PathBuf::from),
        cli.save_dir.map(PathBuf::from),
    )?;

    match cli.command {
        Commands::Saves { json } => {
            let app = App::create(&config)?;
            app.handle_saves(json).await?;
        }
        Commands::Create {
            file,
            description,
            tags,
        } => {
            let app = App::create(&config)?;
            app.handle_create(file, description, tags).await?;
        }
        Commands::List { save, json } => {
            let app = App::create(&config)?;
            app.handle_list(save, json).await?;
        }
        Commands::Restore { id, yes } => {
            let app = App::create(&config)?;
            app.handle_restore(id, yes).await?;
        }
        Commands::Rm { id, yes } => {
            let app = App::create(&config)?;
            app.handle_rm(id, yes).await?;
        }
        Commands::Edit {
            id,
            description,
            tags,
            game_date,
        } => {
            let app = App::create(&config)?;
            app.handle_edit(id, description, tags, game_date).await?;
        }
        Commands::Config {
            backup_dir,
            save_dir,
            max_backups,
            save_ext,
        } => {
            handle_config_command(backup_dir, save_dir, max_backups, save_ext)?;
        }
    }

    Ok(())
}

fn handle_config_command(
    backup_dir: Option<String>,
    save_dir: Option<String>,
    max_backups: Option<usize>,
    save_ext: Option<String>,
) -> anyhow::Result<()> {
    let (path, mut cfg) = load_file_config_with_path();

    let mut changed = false;
    if let Some(d) = backup_dir {
        cfg.backup_dir = Some(d);
        changed = true;
    }
    if let Some(d) = save_dir {
        cfg.save_dir = Some(d);
        changed = true;
    }
    if let Some(n) = max_backups {
        if n == 0 {
            anyhow::bail!("max_backups must be at least 1");
        }
        cfg.max_backups = Some(n);
        changed = true;
    }
    if let Some(e) = save_ext {
        cfg.save_ext = Some(e);
        changed = true;
    }

    if changed {
        save_file_config(&path, &cfg)?;
        println!("Config written to {}", path.display());
    } else {
        let effective = Config::create(None, None)?;
        println!("backup_dir:  {}", effective.backup_dir.display());
        println!("save_dir:    {}", effective.save_dir.display());
        println!("max_backups: {}", effective.max_backups);
        println!("save_ext:    {}", effective.save_ext);
    }
    Ok(())
}
