use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ThreadId;
use crate::lead::LeadLevel;

/// Conversation with a contact, as shown in the inbox sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub title: Option<String>,
    pub contact_name: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Backend-computed score, 0..=100
    pub lead_score: Option<u8>,
    pub lead_level: Option<LeadLevel>,
    pub lead_stage: Option<String>,
    pub human_takeover: bool,
    pub funnel_id: Option<String>,
    pub stage_id: Option<String>,
    pub origin: Option<String>,
    pub product: Option<String>,
    pub automation_status: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Thread {
    pub fn new(id: impl Into<ThreadId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            contact_name: None,
            last_message: None,
            last_message_at: None,
            created_at: None,
            lead_score: None,
            lead_level: None,
            lead_stage: None,
            human_takeover: false,
            funnel_id: None,
            stage_id: None,
            origin: None,
            product: None,
            automation_status: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn display_name(&self) -> String {
        self.contact_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.title.as_deref().filter(|s| !s.trim().is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Conversa #{}", self.id))
    }

    /// Last message time, falling back to creation time
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_message_at.or(self.created_at)
    }
}

/// Body of the "new conversation" action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewThread {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl NewThread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn contact_name(mut self, name: impl Into<String>) -> Self {
        self.contact_name = Some(name.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Partial update of a thread; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_takeover: Option<bool>,
}

impl ThreadUpdate {
    pub fn takeover(active: bool) -> Self {
        Self {
            human_takeover: Some(active),
            ..Self::default()
        }
    }

    pub fn origin(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            ..Self::default()
        }
    }

    pub fn metadata(metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::default()
        }
    }
}
