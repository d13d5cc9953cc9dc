//! Login, logout and whoami commands

use anyhow::Result;
use colored::Colorize;

use mimo_core::LogEvent;

use super::{finish, get_context, get_logger, get_root_dir, log_event, read_text, SecretSource};
use crate::output;
use crate::session::Session;

pub fn run_login(user_id: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let user_id = read_text(user_id, "User id")?;
    let password = SecretSource::from_env().read(password, "Password")?;

    let result = ctx.auth_service.login(&user_id, &password);
    match &result {
        Ok(profile) => {
            log_event(
                &logger,
                LogEvent::new("login_succeeded")
                    .with_user(&profile.user_id)
                    .with_page("login"),
            );
            Session::new(profile.clone()).save(&get_root_dir())?;
        }
        Err(e) => log_event(
            &logger,
            LogEvent::new("login_failed")
                .with_user(&user_id)
                .with_page("login")
                .with_error(e),
        ),
    }

    finish(result, json, |profile| {
        println!("Logged in as {} ({})", profile.nickname.bold(), profile.user_id);
    })
}

pub fn run_logout(json: bool) -> Result<()> {
    let root = get_root_dir();
    let user = Session::load(&root)?.map(|s| s.profile.user_id);
    let was_logged_in = Session::clear(&root)?;

    if json {
        println!("{}", serde_json::json!({ "loggedOut": was_logged_in, "userId": user }));
    } else if was_logged_in {
        output::success("Logged out");
    } else {
        output::info("Not logged in");
    }
    Ok(())
}

pub fn run_whoami(json: bool) -> Result<()> {
    let session = Session::load(&get_root_dir())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    match session {
        Some(session) => {
            println!("{} ({})", session.profile.nickname.bold(), session.profile.user_id);
            println!(
                "{}",
                format!(
                    "Logged in since {}",
                    session.logged_in_at.format("%Y-%m-%d %H:%M")
                )
                .dimmed()
            );
        }
        None => output::info("Not logged in"),
    }
    Ok(())
}
