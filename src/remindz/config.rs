use crate::error::{RemindzError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DEDUP_CAPACITY: usize = 1024;
const DEFAULT_MAX_SLEEP_SECS: u64 = 60;
pub const DEFAULT_BODY: &str = "Reminder due!";

/// Where notifications go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierMode {
    /// Desktop notifier when a graphical session has one, terminal otherwise
    #[default]
    Auto,
    Desktop,
    Terminal,
}

impl fmt::Display for NotifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotifierMode::Auto => "auto",
            NotifierMode::Desktop => "desktop",
            NotifierMode::Terminal => "terminal",
        })
    }
}

impl FromStr for NotifierMode {
    type Err = RemindzError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(NotifierMode::Auto),
            "desktop" => Ok(NotifierMode::Desktop),
            "terminal" => Ok(NotifierMode::Terminal),
            other => Err(RemindzError::Config(format!(
                "Unknown notifier '{}' (expected auto, desktop or terminal)",
                other
            ))),
        }
    }
}

/// Configuration for remindz, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemindzConfig {
    #[serde(default)]
    pub notifier: NotifierMode,

    /// How many recently delivered notifications are remembered for dedup
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    /// Upper bound on how long `watch` sleeps between checks
    #[serde(default = "default_max_sleep_secs")]
    pub max_sleep_secs: u64,

    /// Body used when a reminder has no description
    #[serde(default = "default_body")]
    pub default_body: String,
}

fn default_dedup_capacity() -> usize {
    DEFAULT_DEDUP_CAPACITY
}

fn default_max_sleep_secs() -> u64 {
    DEFAULT_MAX_SLEEP_SECS
}

fn default_body() -> String {
    DEFAULT_BODY.to_string()
}

impl Default for RemindzConfig {
    fn default() -> Self {
        Self {
            notifier: NotifierMode::default(),
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            max_sleep_secs: DEFAULT_MAX_SLEEP_SECS,
            default_body: default_body(),
        }
    }
}

impl RemindzConfig {
    pub const KEYS: [&'static str; 4] = [
        "notifier",
        "dedup-capacity",
        "max-sleep-secs",
        "default-body",
    ];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config = Self::read(config_dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`RemindzConfig::load`] without validation, so `config set` can
    /// repair a bad file.
    pub(crate) fn read<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(RemindzError::Io)?;
        let config: RemindzConfig =
            serde_json::from_str(&content).map_err(RemindzError::Serialization)?;
        Ok(config)
    }

    /// Hand-edited files get the same limits as `set`.
    fn validate(&self) -> Result<()> {
        if self.dedup_capacity == 0 {
            return Err(must_be_positive("dedup-capacity"));
        }
        if self.max_sleep_secs == 0 {
            return Err(must_be_positive("max-sleep-secs"));
        }
        Ok(())
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(RemindzError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(RemindzError::Serialization)?;
        fs::write(config_path, content).map_err(RemindzError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "notifier" => Ok(self.notifier.to_string()),
            "dedup-capacity" => Ok(self.dedup_capacity.to_string()),
            "max-sleep-secs" => Ok(self.max_sleep_secs.to_string()),
            "default-body" => Ok(self.default_body.clone()),
            other => Err(unknown_key(other)),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "notifier" => self.notifier = value.parse()?,
            "dedup-capacity" => {
                let capacity: usize = parse_number(key, value)?;
                if capacity == 0 {
                    return Err(must_be_positive(key));
                }
                self.dedup_capacity = capacity;
            }
            "max-sleep-secs" => {
                let secs: u64 = parse_number(key, value)?;
                if secs == 0 {
                    return Err(must_be_positive(key));
                }
                self.max_sleep_secs = secs;
            }
            "default-body" => self.default_body = value.to_string(),
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RemindzError::Config(format!("{} expects a number, got '{}'", key, value)))
}

fn must_be_positive(key: &str) -> RemindzError {
    RemindzError::Config(format!("{} must be at least 1", key))
}

fn unknown_key(key: &str) -> RemindzError {
    RemindzError::Config(format!("Unknown config key: {}", key))
}
