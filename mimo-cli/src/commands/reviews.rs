//! Reviews command - list and write reviews

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use mimo_core::services::REVIEW_SAVED;
use mimo_core::LogEvent;

use super::{finish, get_context, get_logger, log_event, read_text, require_session};
use crate::output;

#[derive(Subcommand)]
pub enum ReviewsCommands {
    /// List my reviews, oldest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a review
    Add {
        /// Movie title
        #[arg(long, short)]
        title: Option<String>,
        /// Review text (read from stdin when piped and omitted)
        #[arg(long, short)]
        body: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn read_body(flag: Option<String>) -> Result<String> {
    if flag.is_none() && atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read review from stdin")?;
        return Ok(buffer);
    }
    read_text(flag, "Review")
}

pub fn run(command: ReviewsCommands) -> Result<()> {
    let session = require_session()?;
    let ctx = get_context()?;
    let user_id = session.user_id();

    match command {
        ReviewsCommands::List { json } => {
            let result = ctx.review_service.list(user_id);
            finish(result, json, |reviews| {
                if reviews.is_empty() {
                    println!("No reviews yet.");
                    return;
                }
                let mut table = output::create_table();
                table.set_header(vec!["Written", "Title", "Review"]);
                for review in reviews {
                    table.add_row(vec![
                        review.created_at.as_str(),
                        review.title.as_str(),
                        review.review.as_str(),
                    ]);
                }
                println!("{}", table);
            })
        }
        ReviewsCommands::Add { title, body, json } => {
            let logger = get_logger();
            let title = read_text(title, "Movie title")?;
            let body = read_body(body)?;

            let result = ctx.review_service.add(user_id, &title, &body);
            match &result {
                Ok(_) => log_event(
                    &logger,
                    LogEvent::new("review_added")
                        .with_user(user_id)
                        .with_page("mypage"),
                ),
                Err(e) => log_event(
                    &logger,
                    LogEvent::new("review_add_failed")
                        .with_user(user_id)
                        .with_page("mypage")
                        .with_error(e),
                ),
            }

            finish(result, json, |review| {
                output::success(REVIEW_SAVED);
                println!("{}", format!("{}  {}", review.created_at, review.title).dimmed());
            })
        }
    }
}
