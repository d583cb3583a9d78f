use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ThreadId;

/// CRM record attached 1:1 to a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ThreadId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    pub origin: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Contact {
    pub fn new(id: impl Into<ThreadId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            phone: None,
            tags: Vec::new(),
            notes: Vec::new(),
            reminders: Vec::new(),
            origin: None,
            created_at: None,
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.phone.as_deref())
            .or(self.email.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Contato #{}", self.id))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Reminders not yet done, soonest first
    pub fn open_reminders(&self) -> Vec<&Reminder> {
        let mut open: Vec<&Reminder> = self.reminders.iter().filter(|r| !r.done).collect();
        open.sort_by_key(|r| r.due_at);
        open
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(deserialize_with = "crate::wire::de_string_id")]
    pub id: String,
    pub content: String,
    #[serde(default, deserialize_with = "crate::wire::de_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(deserialize_with = "crate::wire::de_string_id")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "crate::wire::de_opt_timestamp")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReminder {
    pub title: String,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReminderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}
