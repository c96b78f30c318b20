use chrono::{DateTime, Utc};
use colored::Colorize;
use remindz::api::{CmdMessage, ListedReminder, MessageLevel};
use remindz::config::RemindzConfig;
use serde::Serialize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const SCHEDULE_WIDTH: usize = 30;
const WHEN_WIDTH: usize = 16;
const DONE_MARKER: &str = "✓";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_json<T: Serialize>(value: &T) -> remindz::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(super) fn print_config(config: &RemindzConfig) {
    for key in RemindzConfig::KEYS {
        if let Ok(value) = config.get(key) {
            println!("{} = {}", key, value);
        }
    }
}

pub(super) fn print_reminders(reminders: &[ListedReminder], now: DateTime<Utc>) {
    if reminders.is_empty() {
        println!("No reminders found.");
        return;
    }

    for listed in reminders {
        let reminder = &listed.reminder;
        let idx_str = format!("{}. ", reminder.id);
        let marker = if reminder.completed {
            format!("{} ", DONE_MARKER)
        } else {
            "  ".to_string()
        };

        let fixed_width = marker.width() + idx_str.width() + SCHEDULE_WIDTH + WHEN_WIDTH + 2;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&reminder.title, available);
        let padding = available.saturating_sub(title_display.width());

        let schedule = truncate_to_width(&listed.schedule, SCHEDULE_WIDTH);
        let schedule = format!("{:<width$}", schedule, width = SCHEDULE_WIDTH);

        let when = match (reminder.completed, listed.next_fire) {
            (true, _) => "done".to_string(),
            (false, Some(at)) => format_relative(at, now),
            (false, None) => "-".to_string(),
        };
        let when = format!("{:>width$}", when, width = WHEN_WIDTH);
        let overdue = !reminder.completed && listed.next_fire.is_some_and(|at| at <= now);

        let title_colored = if reminder.completed {
            title_display.dimmed()
        } else {
            title_display.normal()
        };
        let when_colored = if overdue { when.red() } else { when.dimmed() };

        println!(
            "{}{}{}{}  {}{}",
            marker.green(),
            idx_str.yellow(),
            title_colored,
            " ".repeat(padding),
            schedule.cyan(),
            when_colored
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

/// "in 3 hours" for upcoming instants, "2 days ago" for overdue ones.
fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = at.signed_duration_since(now);
    if delta.num_seconds() <= 0 {
        let formatter = Formatter::new();
        return formatter.convert((-delta).to_std().unwrap_or_default());
    }

    let mut formatter = Formatter::new();
    formatter.ago("");
    format!("in {}", formatter.convert(delta.to_std().unwrap_or_default()).trim())
}
