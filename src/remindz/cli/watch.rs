use super::print::print_messages;
use super::setup::CliApi;
use chrono::{DateTime, Utc};
use colored::Colorize;
use remindz::error::Result;
use std::time::Duration;

/// Fire reminders in the foreground until Ctrl-C.
pub(super) fn run(api: &mut CliApi, max_sleep: Duration) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch_loop(api, max_sleep))
}

async fn watch_loop(api: &mut CliApi, max_sleep: Duration) -> Result<()> {
    let armed = api.load()?;
    tracing::info!(armed, "watching reminders");
    println!(
        "{}",
        format!("Watching {} reminder(s). Press Ctrl-C to stop.", armed).dimmed()
    );

    loop {
        let result = api.run_due()?;
        print_messages(&result.messages);

        let sleep_for = sleep_duration(api.next_wakeup(), api.now(), max_sleep);
        tracing::debug!(secs = sleep_for.as_secs(), "sleeping");

        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Stopped.".dimmed());
                break;
            }
        }
    }
    Ok(())
}

/// Sleep until the next job, but never longer than `max_sleep` so clock
/// jumps and suspends are noticed.
fn sleep_duration(
    next_wakeup: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    max_sleep: Duration,
) -> Duration {
    match next_wakeup {
        Some(at) => (at - now).to_std().unwrap_or(Duration::ZERO).min(max_sleep),
        None => max_sleep,
    }
}
