use chrono::Local;
use directories::ProjectDirs;
use remindz::api::RemindzApi;
use remindz::config::RemindzConfig;
use remindz::context::ReminderContext;
use remindz::error::{RemindzError, Result};
use remindz::notify::{select_channel, AnyChannel};
use remindz::store::fs::FileStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Overrides the data directory (store slots and config.json).
pub const HOME_ENV: &str = "REMINDZ_HOME";
/// Log filter directives, e.g. `REMINDZ_LOG=remindz=debug`.
pub const LOG_ENV: &str = "REMINDZ_LOG";

pub type CliApi = RemindzApi<FileStore, AnyChannel, Local>;

/// Logs go to stderr so they never mix with command output or JSON.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "remindz=info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "remindz", "remindz")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| RemindzError::Config("Could not determine data directory".to_string()))
}

pub fn init_api(data_dir: PathBuf) -> Result<(CliApi, RemindzConfig)> {
    let config = RemindzConfig::load(&data_dir)?;
    let channel = select_channel(config.notifier);
    let store = FileStore::new(data_dir.clone());
    let ctx = ReminderContext::new(store, channel, Local, &config);
    tracing::debug!(dir = %data_dir.display(), notifier = %config.notifier, "initialized");
    Ok((RemindzApi::new(ctx, data_dir), config))
}
