use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ReminderId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn is_recurring(self) -> bool {
        !matches!(self, Frequency::Once)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Frequency::Once),
            "hourly" => Ok(Frequency::Hourly),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(format!("Unknown frequency: {}", other)),
        }
    }
}

/// A stored reminder. Field names follow the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ReminderId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub frequency: Frequency,
    pub completed: bool,
}

impl Reminder {
    /// Active reminders are the ones that own a scheduled job.
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Creation payload: everything but the store-assigned `id` and `completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub frequency: Frequency,
}

impl NewReminder {
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>, frequency: Frequency) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date,
            frequency,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_reminder(self, id: ReminderId) -> Reminder {
        Reminder {
            id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            frequency: self.frequency,
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_camel_case_and_lowercase_frequency() {
        let reminder = NewReminder::new(
            "Pay bill",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Frequency::Once,
        )
        .into_reminder(1);

        let json = serde_json::to_value(&reminder).unwrap();
        assert_eq!(json["dueDate"], "2024-01-01T09:00:00Z");
        assert_eq!(json["frequency"], "once");
        assert_eq!(json["completed"], false);
        assert!(json.get("description").is_none());
    }

    #[test]
    fn parses_frequency_case_insensitively() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn reads_reminder_without_description() {
        let json = r#"{"id":3,"title":"Stretch","dueDate":"2024-05-02T07:30:00Z","frequency":"daily","completed":false}"#;
        let reminder: Reminder = serde_json::from_str(json).unwrap();
        assert_eq!(reminder.id, 3);
        assert_eq!(reminder.description, None);
        assert!(reminder.frequency.is_recurring());
    }
}
