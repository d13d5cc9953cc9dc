//! Profile command - my page: show profile, change nickname or password

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use mimo_core::domain::result::{Error, Result as CoreResult};
use mimo_core::LogEvent;

use super::{
    finish, get_context, get_logger, get_root_dir, log_event, require_session, SecretSource,
};
use crate::output;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the logged-in user's profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the nickname
    Nickname {
        /// New nickname
        nickname: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the password
    Password {
        /// Current password
        #[arg(long)]
        current: Option<String>,
        /// New password (at least 8 characters)
        #[arg(long)]
        new: Option<String>,
        /// New password again
        #[arg(long)]
        confirm: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Form checks that need both the current and the new password
fn check_new_password(current: &str, new: &str, confirm: &str) -> CoreResult<()> {
    if new != confirm {
        return Err(Error::validation("new password confirmation does not match"));
    }
    if new == current {
        return Err(Error::validation("new password must differ from the current one"));
    }
    Ok(())
}

pub fn run(command: ProfileCommands) -> Result<()> {
    let mut session = require_session()?;
    let ctx = get_context()?;
    let root = get_root_dir();

    match command {
        ProfileCommands::Show { json } => {
            let result = ctx
                .auth_service
                .get_profile(session.user_id())
                .and_then(|p| p.ok_or_else(|| Error::not_found("user not found")));
            if let Ok(profile) = &result {
                session.refresh(profile.clone(), &root)?;
            }

            finish(result, json, |profile| {
                println!("{}", "My Page".bold());
                let mut table = output::create_table();
                table.add_row(vec!["User id", profile.user_id.as_str()]);
                table.add_row(vec!["Nickname", profile.nickname.as_str()]);
                table.add_row(vec!["Email", profile.email.as_str()]);
                table.add_row(vec!["Joined", profile.joined.as_str()]);
                println!("{}", table);
            })
        }
        ProfileCommands::Nickname { nickname, json } => {
            let logger = get_logger();
            let user_id = session.user_id().to_string();
            let result = ctx.profile_service.update_nickname(&user_id, &nickname);

            match &result {
                Ok(_) => {
                    log_event(
                        &logger,
                        LogEvent::new("nickname_changed")
                            .with_user(&user_id)
                            .with_page("mypage"),
                    );
                    if let Some(profile) = ctx.auth_service.get_profile(&user_id)? {
                        session.refresh(profile, &root)?;
                    }
                }
                Err(e) => log_event(
                    &logger,
                    LogEvent::new("nickname_change_failed")
                        .with_user(&user_id)
                        .with_page("mypage")
                        .with_error(e),
                ),
            }

            finish(result, json, |message| output::success(message))
        }
        ProfileCommands::Password {
            current,
            new,
            confirm,
            json,
        } => {
            let logger = get_logger();
            let user_id = session.user_id().to_string();
            let mut secrets = SecretSource::from_env();
            let current = secrets.read(current, "Current password")?;
            let (new, confirm) = secrets.read_with_confirm(
                new,
                confirm,
                "New password",
                "Confirm new password",
            )?;

            let result = check_new_password(&current, &new, &confirm)
                .and_then(|()| ctx.profile_service.change_password(&user_id, &current, &new));

            match &result {
                Ok(_) => log_event(
                    &logger,
                    LogEvent::new("password_changed")
                        .with_user(&user_id)
                        .with_page("mypage"),
                ),
                Err(e) => log_event(
                    &logger,
                    LogEvent::new("password_change_failed")
                        .with_user(&user_id)
                        .with_page("mypage")
                        .with_error(e),
                ),
            }

            finish(result, json, |message| output::success(message))
        }
    }
}
