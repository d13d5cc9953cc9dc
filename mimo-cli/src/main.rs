//! Mimo CLI - accounts, favorites and reviews in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;
mod session;

use commands::{account, backup, config, favorites, login, logs, profile, reviews, signup};

/// Mimo - your movie favorites and reviews in the terminal
///
/// Data lives in the current directory, or in MIMO_DIR when set.
#[derive(Parser)]
#[command(name = "mimo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Signup {
        /// User id (at least 3 characters, no spaces)
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
        /// Password (or MIMO_PASSWORD, piped stdin, or a prompt)
        #[arg(long)]
        password: Option<String>,
        /// Password confirmation (defaults to --password when not prompting)
        #[arg(long)]
        password_confirm: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in with a user id and password
    Login {
        /// User id
        user_id: Option<String>,
        /// Password (or MIMO_PASSWORD, piped stdin, or a prompt)
        #[arg(long, short)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log out
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show who is logged in
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// My page: profile, nickname and password
    Profile {
        #[command(subcommand)]
        command: profile::ProfileCommands,
    },

    /// Favorite titles
    Favorites {
        #[command(subcommand)]
        command: favorites::FavoritesCommands,
    },

    /// Reviews
    Reviews {
        #[command(subcommand)]
        command: reviews::ReviewsCommands,
    },

    /// Find your user id by email
    FindId {
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Request a password reset
    ResetPassword {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage backups
    Backup {
        #[command(subcommand)]
        command: backup::BackupCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

impl Commands {
    /// Name recorded with `command_executed`
    fn name(&self) -> &'static str {
        match self {
            Commands::Signup { .. } => "signup",
            Commands::Login { .. } => "login",
            Commands::Logout { .. } => "logout",
            Commands::Whoami { .. } => "whoami",
            Commands::Profile { .. } => "profile",
            Commands::Favorites { .. } => "favorites",
            Commands::Reviews { .. } => "reviews",
            Commands::FindId { .. } => "find-id",
            Commands::ResetPassword { .. } => "reset-password",
            Commands::Backup { .. } => "backup",
            Commands::Logs { .. } => "logs",
            Commands::Config { .. } => "config",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<commands::Reported>().is_none() {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if !matches!(cli.command, Commands::Logs { .. }) {
        let logger = commands::get_logger();
        if let Some(l) = &logger {
            let _ = l.log_command(cli.command.name());
        }
    }

    match cli.command {
        Commands::Signup {
            user_id,
            email,
            nickname,
            password,
            password_confirm,
            json,
        } => signup::run(signup::SignupArgs {
            user_id,
            email,
            nickname,
            password,
            password_confirm,
            json,
        }),
        Commands::Login {
            user_id,
            password,
            json,
        } => login::run_login(user_id, password, json),
        Commands::Logout { json } => login::run_logout(json),
        Commands::Whoami { json } => login::run_whoami(json),
        Commands::Profile { command } => profile::run(command),
        Commands::Favorites { command } => favorites::run(command),
        Commands::Reviews { command } => reviews::run(command),
        Commands::FindId { email, json } => account::run_find_id(&email, json),
        Commands::ResetPassword {
            user_id,
            email,
            json,
        } => account::run_reset_password(&user_id, &email, json),
        Commands::Backup { command } => backup::run(command),
        Commands::Logs { command } => logs::run(command),
        Commands::Config { command } => config::run(command),
    }
}
