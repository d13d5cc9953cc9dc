//! Signup command - register a new account and log in

use anyhow::Result;
use colored::Colorize;

use mimo_core::services::SignUpRequest;
use mimo_core::LogEvent;

use super::{
    finish, get_context, get_logger, get_root_dir, log_event, read_text, SecretSource,
};
use crate::session::Session;

pub struct SignupArgs {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub json: bool,
}

pub fn run(args: SignupArgs) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let user_id = read_text(args.user_id, "User id")?;
    let email = read_text(args.email, "Email")?;
    let nickname = read_text(args.nickname, "Nickname")?;
    let (password, password_confirm) = SecretSource::from_env().read_with_confirm(
        args.password,
        args.password_confirm,
        "Password",
        "Confirm password",
    )?;

    let request = SignUpRequest {
        user_id,
        password,
        password_confirm,
        email: email.trim().to_string(),
        nickname: nickname.trim().to_string(),
    };

    let result = ctx.registration_service.sign_up(&request);
    match &result {
        Ok(profile) => {
            log_event(
                &logger,
                LogEvent::new("signup_completed")
                    .with_user(&profile.user_id)
                    .with_page("signup"),
            );
            Session::new(profile.clone()).save(&get_root_dir())?;
        }
        Err(e) => log_event(
            &logger,
            LogEvent::new("signup_failed")
                .with_user(&request.user_id)
                .with_page("signup")
                .with_error(e),
        ),
    }

    finish(result, args.json, |profile| {
        println!("{}", "Sign-up complete".green());
        println!("Welcome, {} ({})", profile.nickname.bold(), profile.user_id);
    })
}
