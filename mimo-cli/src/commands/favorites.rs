//! Favorites command - browse and prune the favorites grid

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use mimo_core::{FavoriteEntry, LogEvent, Page};

use super::{finish, get_context, get_logger, log_event, require_session};
use crate::output;

/// Grid width; with 8 items per page this gives 2 rows of 4
const GRID_COLUMNS: usize = 4;

#[derive(Subcommand)]
pub enum FavoritesCommands {
    /// Show one page of favorites
    List {
        /// Page number (1-based, clamped to the last page)
        #[arg(long, short, default_value = "1")]
        page: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a title from favorites
    Remove {
        /// Title id to remove
        title_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn render_grid(page: &Page<FavoriteEntry>) {
    if page.items.is_empty() {
        println!("No favorites yet.");
        return;
    }

    let mut table = output::create_table();
    for row in page.rows(GRID_COLUMNS) {
        table.add_row(
            row.iter()
                .map(|f| format!("{}\n[{}] {}", f.poster, f.title_id, f.title))
                .collect::<Vec<_>>(),
        );
    }
    println!("{}", table);

    let mut nav = format!("Page {} / {}", page.page, page.total_pages);
    if page.has_prev() {
        nav.push_str(&format!("  (prev: --page {})", page.page - 1));
    }
    if page.has_next() {
        nav.push_str(&format!("  (next: --page {})", page.page + 1));
    }
    println!("{}", nav.dimmed());
}

pub fn run(command: FavoritesCommands) -> Result<()> {
    let session = require_session()?;
    let ctx = get_context()?;
    let user_id = session.user_id();

    match command {
        FavoritesCommands::List { page, json } => {
            let result = ctx.favorite_service.page(user_id, page);
            finish(result, json, |page| {
                println!("{}", format!("{}'s favorites", session.profile.nickname).bold());
                render_grid(page);
            })
        }
        FavoritesCommands::Remove { title_id, json } => {
            let logger = get_logger();
            let result = ctx.favorite_service.remove(user_id, title_id);
            if result.is_ok() {
                log_event(
                    &logger,
                    LogEvent::new("favorite_removed")
                        .with_user(user_id)
                        .with_page("mypage"),
                );
            }
            finish(result, json, |_| {
                output::success(&format!("Removed title {} from favorites", title_id))
            })
        }
    }
}
