//! `nixlayer backup ...`

use anyhow::{Context as _, Result};

use super::Context;
use crate::cli::BackupCommands;
use crate::ui::{format, json};

pub fn run(ctx: &Context, command: BackupCommands) -> Result<()> {
    let coordinator = ctx.coordinator();
    let backups = coordinator.backups();
    match command {
        BackupCommands::Create { label } => {
            let backup = backups
                .create(label.as_deref())
                .context("creating backup")?;
            if ctx.json {
                json::emit(json::data("backup create", &backup))?;
            } else {
                println!(
                    "Created {} ({})",
                    backup.path.display(),
                    format::size(backup.size)
                );
            }
        }
        BackupCommands::List => {
            let list = backups.list()?;
            if ctx.json {
                json::emit(json::data("backup list", serde_json::json!({ "backups": list })))?;
            } else if list.is_empty() {
                println!("No backups in {}", ctx.layout.backups_dir().display());
            } else {
                for backup in &list {
                    println!("{}", format::backup_row(backup));
                }
            }
        }
        BackupCommands::Restore { identifier } => {
            let report = coordinator
                .restore(&identifier)
                .with_context(|| format!("restoring '{identifier}'"))?;
            if ctx.json {
                json::emit(json::data("backup restore", &report))?;
            } else {
                println!("Restored {}", report.restored.file_name());
                println!("  previous state saved to {}", report.snapshot.display());
            }
        }
        BackupCommands::Delete { identifier } => {
            let deleted = backups.delete(&identifier)?;
            if ctx.json {
                json::emit(json::data("backup delete", &deleted))?;
            } else {
                println!("Deleted {}", deleted.file_name());
            }
        }
        BackupCommands::Prune { keep } => {
            let removed = backups.prune(keep)?;
            if ctx.json {
                json::emit(json::data(
                    "backup prune",
                    serde_json::json!({ "removed": removed, "kept": keep }),
                ))?;
            } else if removed.is_empty() {
                println!("Nothing to prune");
            } else {
                for backup in &removed {
                    println!("Deleted {}", backup.file_name());
                }
            }
        }
    }
    Ok(())
}
