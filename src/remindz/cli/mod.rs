//! # CLI Layer
//!
//! This module is **one possible UI client** for remindz. It is the only place
//! that touches stdout/stderr, parses arguments, reads the wall clock through
//! the API, or sleeps.
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `setup`: logging, data directory, API construction
//! - `handle_*()`: Per-command handlers that call the API and format output
//! - `print`: Output formatting
//! - `watch`: the foreground loop that fires reminders as they come due
//!
//! With `--json`, reminder commands print the API's plain responses
//! (`[...]`, `{...}` or `{"message": ...}`) instead of styled text.

mod args;
mod parse;
mod print;
mod setup;
mod watch;

use args::{Cli, Commands};
use chrono::Local;
use clap::Parser;
use print::{print_config, print_json, print_messages, print_reminders};
use remindz::api::{self, ConfigAction, ListFilter, Response};
use remindz::error::{RemindzError, Result};
use remindz::model::{Frequency, NewReminder};
use remindz::notify::Delivery;
use serde_json::json;
use setup::CliApi;
use std::path::Path;
use std::time::Duration;

struct AppContext {
    api: CliApi,
    max_sleep: Duration,
    json: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    setup::init_logging(cli.verbose);

    let data_dir = setup::data_dir()?;

    // Config runs before the API so a bad config file can still be fixed
    if let Some(Commands::Config { key, value }) = &cli.command {
        return handle_config(&data_dir, key.clone(), value.clone());
    }

    let (api, config) = setup::init_api(data_dir)?;
    let mut ctx = AppContext {
        api,
        max_sleep: Duration::from_secs(config.max_sleep_secs),
        json: cli.json,
    };

    match cli.command {
        Some(Commands::Add {
            title,
            due,
            every,
            description,
        }) => handle_add(&mut ctx, title.join(" "), &due, every, description),
        Some(Commands::List { active, completed }) => {
            let filter = if active {
                ListFilter::Active
            } else if completed {
                ListFilter::Completed
            } else {
                ListFilter::All
            };
            handle_list(&mut ctx, filter)
        }
        Some(Commands::Done { id }) => handle_done(&mut ctx, id),
        Some(Commands::Rm { id }) => handle_rm(&mut ctx, id),
        Some(Commands::Tick) => handle_tick(&mut ctx),
        Some(Commands::Watch) => watch::run(&mut ctx.api, ctx.max_sleep),
        Some(Commands::Config { .. }) | None => handle_list(&mut ctx, ListFilter::All),
    }
}

fn handle_add(
    ctx: &mut AppContext,
    title: String,
    due: &str,
    every: Frequency,
    description: Option<String>,
) -> Result<()> {
    let due = parse::parse_due(due, &Local).map_err(RemindzError::InvalidReminder)?;
    let mut data = NewReminder::new(title, due, every);
    if let Some(description) = description {
        data = data.with_description(description);
    }

    if ctx.json {
        return print_json(&ctx.api.create_reminder(data));
    }
    let result = ctx.api.create(data)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &mut AppContext, filter: ListFilter) -> Result<()> {
    if ctx.json {
        let response = match ctx.api.fetch_reminders() {
            Response::Ok(reminders) => Response::Ok(
                reminders
                    .into_iter()
                    .filter(|r| match filter {
                        ListFilter::All => true,
                        ListFilter::Active => r.is_active(),
                        ListFilter::Completed => r.completed,
                    })
                    .collect(),
            ),
            failure => failure,
        };
        return print_json(&response);
    }

    let result = ctx.api.list(filter)?;
    let now = ctx.api.now();
    print_reminders(&result.listed_reminders, now);
    print_messages(&result.messages);
    Ok(())
}

fn handle_done(ctx: &mut AppContext, id: u64) -> Result<()> {
    if ctx.json {
        return print_json(&ctx.api.mark_completed(id));
    }
    let result = ctx.api.complete(id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_rm(ctx: &mut AppContext, id: u64) -> Result<()> {
    if ctx.json {
        return print_json(&ctx.api.delete_reminder(id));
    }
    let result = ctx.api.delete(id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_tick(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.run_due()?;
    if ctx.json {
        let firings: Vec<_> = result
            .firings
            .iter()
            .map(|f| {
                let error = match &f.delivery {
                    Delivery::Failed(e) => Some(e.as_str()),
                    _ => None,
                };
                json!({
                    "id": f.reminder.id,
                    "title": f.reminder.title,
                    "occurrence": f.occurrence,
                    "delivery": f.delivery.label(),
                    "error": error,
                    "completed": f.completed,
                })
            })
            .collect();
        return print_json(&firings);
    }

    if result.firings.is_empty() {
        println!("Nothing due.");
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(data_dir: &Path, key: Option<String>, value: Option<String>) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = api::config(data_dir, action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    Ok(())
}
