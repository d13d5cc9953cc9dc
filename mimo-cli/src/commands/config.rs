//! Config command - show and change settings.json

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use mimo_core::config::Config;

use super::get_root_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings (environment overrides applied)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a value: `storage` (csv | duckdb) or `allowDemoAccounts` (true | false)
    Set {
        key: String,
        value: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let root = get_root_dir();

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&root)?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "storage": config.storage.to_string(),
                        "allowDemoAccounts": config.allow_demo_accounts,
                        "dataDir": root.to_string_lossy(),
                    })
                );
                return Ok(());
            }

            let mut table = output::create_table();
            table.add_row(vec!["storage".to_string(), config.storage.to_string()]);
            table.add_row(vec![
                "allowDemoAccounts".to_string(),
                config.allow_demo_accounts.to_string(),
            ]);
            table.add_row(vec!["data dir".to_string(), root.display().to_string()]);
            println!("{}", table);
        }
        ConfigCommands::Set { key, value } => {
            std::fs::create_dir_all(&root)?;
            let mut config = Config::load_file(&root)?;
            config.set(&key, &value)?;
            config.save(&root)?;
            output::success(&format!("Set {} = {}", key, value));
            if std::env::var("MIMO_STORAGE").is_ok() || std::env::var("MIMO_ALLOW_DEMO_ACCOUNTS").is_ok() {
                println!(
                    "{}",
                    "Note: environment overrides are set and take precedence.".dimmed()
                );
            }
        }
    }

    Ok(())
}
