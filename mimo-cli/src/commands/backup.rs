//! Backup command - manage backups of the data root

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_root_dir;
use crate::output;
use mimo_core::services::BackupService;

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create {
        /// Maximum number of backups to keep
        #[arg(long, short = 'm')]
        max_backups: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List available backups
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore from a backup
    Restore {
        /// Backup name to restore
        name: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear all backups
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn confirm(prompt: String) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

pub fn run(command: BackupCommands) -> Result<()> {
    // Backups work on files only, so no context (and no open database) is needed
    let backup_service = BackupService::new(&get_root_dir());

    match command {
        BackupCommands::Create { max_backups, json } => {
            let result = backup_service.create(max_backups)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", "Backup created".green());
                println!("  Name: {}", result.name);
                println!("  Files: {}", result.file_count);
                println!("  Size: {}", result.size_display());
            }
        }
        BackupCommands::List { json } => {
            let backups = backup_service.list()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&backups)?);
                return Ok(());
            }

            if backups.is_empty() {
                println!("No backups found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Name", "Created", "Files", "Size"]);
            for backup in backups {
                table.add_row(vec![
                    backup.name.clone(),
                    backup.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    backup.file_count.to_string(),
                    backup.size_display(),
                ]);
            }
            println!("{}", table);
        }
        BackupCommands::Restore { name, force, json } => {
            if !force && !json && !confirm(format!("Restore from backup '{}'?", name))? {
                println!("Cancelled.");
                return Ok(());
            }
            let restored = backup_service.restore(&name)?;
            if json {
                println!("{}", serde_json::json!({ "restored": restored.name, "files": restored.file_count }));
            } else {
                output::success(&format!("Data restored from backup: {}", name));
                println!("{}", "A pre-restore backup of the previous data was kept.".dimmed());
            }
        }
        BackupCommands::Clear { force, json } => {
            if !force && !json && !confirm("Delete all backups?".to_string())? {
                println!("Cancelled.");
                return Ok(());
            }
            let result = backup_service.clear()?;
            if json {
                println!("{}", serde_json::json!({ "deleted": result.deleted }));
            } else {
                println!("Deleted {} backup(s)", result.deleted);
            }
        }
    }

    Ok(())
}
