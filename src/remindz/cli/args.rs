use clap::{Parser, Subcommand};
use remindz::model::Frequency;

#[derive(Parser, Debug)]
#[command(name = "remindz", version)]
#[command(about = "Local-first reminders for the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (also raises the log level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a reminder
    #[command(alias = "a", alias = "new")]
    Add {
        /// Title of the reminder
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// When it is due: "YYYY-MM-DD HH:MM" (local time) or RFC 3339
        #[arg(short, long)]
        due: String,

        /// How often it repeats: once, hourly, daily, weekly, monthly
        #[arg(short = 'e', long = "every", default_value = "once")]
        every: Frequency,

        /// Notification body
        #[arg(short = 'm', long)]
        description: Option<String>,
    },

    /// List reminders
    #[command(alias = "ls")]
    List {
        /// Only reminders that are still scheduled
        #[arg(long, conflicts_with = "completed")]
        active: bool,

        /// Only completed reminders
        #[arg(long)]
        completed: bool,
    },

    /// Mark a reminder completed
    #[command(alias = "complete")]
    Done {
        /// Reminder id
        id: u64,
    },

    /// Delete a reminder
    #[command(alias = "delete")]
    Rm {
        /// Reminder id
        id: u64,
    },

    /// Fire every reminder that is due now, then exit
    Tick,

    /// Stay in the foreground and fire reminders as they come due
    Watch,

    /// Get or set configuration
    Config {
        /// Configuration key (notifier, dedup-capacity, max-sleep-secs, default-body)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
