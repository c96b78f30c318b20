use crate::model::ReminderId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemindzError {
    #[error("Reminder not found: {0}")]
    NotFound(ReminderId),

    #[error("Invalid reminder: {0}")]
    InvalidReminder(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RemindzError>;
