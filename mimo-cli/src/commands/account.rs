//! Account recovery commands - find id by email, request a password reset

use anyhow::Result;
use colored::Colorize;

use super::{finish, get_context};
use crate::output;

pub fn run_find_id(email: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.registration_service.find_user_id(email.trim());
    finish(result, json, |user_id| {
        println!("Your user id is {}", user_id.bold());
    })
}

pub fn run_reset_password(user_id: &str, email: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx
        .registration_service
        .request_password_reset(user_id.trim(), email.trim());
    finish(result, json, |message| output::success(message))
}
