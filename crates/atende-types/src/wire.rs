//! Backend payload shapes and their validated conversion into the domain model.
//!
//! The backend contract has drifted over time: ids arrive as numbers or
//! strings, timestamps with or without offsets, and several thread fields
//! live either at the top level or inside `metadata`. Everything is
//! normalised here so the rest of the workspace only sees typed values.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;

use crate::contact::{Contact, Note, Reminder};
use crate::error::{Result, SchemaError};
use crate::ids::{ThreadId, WireId};
use crate::lead::LeadLevel;
use crate::message::{Message, MessageId, Role, TEMP_ID_PREFIX};
use crate::thread::Thread;

/// Highest payload version this client understands
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(i64),
    Text(String),
}

impl WireTimestamp {
    pub fn parse(&self, field: &'static str) -> Result<DateTime<Utc>> {
        match self {
            WireTimestamp::Millis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .ok_or_else(|| SchemaError::invalid(field, format!("out of range: {}", ms))),
            WireTimestamp::Text(text) => parse_timestamp(text)
                .ok_or_else(|| SchemaError::invalid(field, format!("unparseable: {:?}", text))),
        }
    }
}

/// RFC 3339, or a naive date-time taken as UTC
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub(crate) fn de_opt_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<WireTimestamp> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(WireTimestamp::Text(ref s)) if s.trim().is_empty() => Ok(None),
        Some(ts) => ts.parse("timestamp").map(Some).map_err(serde::de::Error::custom),
    }
}

pub(crate) fn de_string_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireId::deserialize(deserializer).map(WireId::into_string)
}

fn check_version(version: Option<u32>) -> Result<()> {
    match version {
        Some(found) if found > SUPPORTED_SCHEMA_VERSION => Err(SchemaError::UnsupportedVersion {
            found,
            supported: SUPPORTED_SCHEMA_VERSION,
        }),
        _ => Ok(()),
    }
}

fn opt_timestamp(raw: Option<WireTimestamp>, field: &'static str) -> Result<Option<DateTime<Utc>>> {
    match raw {
        None => Ok(None),
        Some(WireTimestamp::Text(ref s)) if s.trim().is_empty() => Ok(None),
        Some(ts) => ts.parse(field).map(Some),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireThread {
    pub id: WireId,
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<WireTimestamp>,
    #[serde(default)]
    pub created_at: Option<WireTimestamp>,
    #[serde(default)]
    pub lead_score: Option<f64>,
    #[serde(default)]
    pub lead_level: Option<String>,
    #[serde(default)]
    pub lead_stage: Option<String>,
    #[serde(default)]
    pub human_takeover: Option<bool>,
    #[serde(default)]
    pub funnel_id: Option<WireId>,
    #[serde(default)]
    pub stage_id: Option<WireId>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub automation_status: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// String-ish metadata entry; numbers are stringified
fn meta_str(metadata: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    match metadata.get(key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl TryFrom<WireThread> for Thread {
    type Error = SchemaError;

    fn try_from(wire: WireThread) -> Result<Self> {
        check_version(wire.schema_version)?;

        let metadata = match wire.metadata {
            None | Some(serde_json::Value::Null) => serde_json::Map::new(),
            Some(serde_json::Value::Object(map)) => map,
            Some(other) => {
                return Err(SchemaError::invalid(
                    "metadata",
                    format!("expected an object, got {}", other),
                ))
            }
        };

        let lead_score = match wire.lead_score {
            None => None,
            Some(score) if score.is_finite() && (0.0..=100.0).contains(&score) => {
                Some(score.round() as u8)
            }
            Some(score) => {
                tracing::warn!(thread_id = ?wire.id, score, "Ignoring lead_score outside 0..=100");
                None
            }
        };

        // Unrecognised labels are treated as absent so newer backends do not break the list
        let lead_level = non_empty(wire.lead_level)
            .or_else(|| meta_str(&metadata, "lead_level"))
            .and_then(|label| label.parse::<LeadLevel>().ok());

        let human_takeover = wire
            .human_takeover
            .or_else(|| metadata.get("human_takeover").and_then(|v| v.as_bool()))
            .unwrap_or(false);

        Ok(Thread {
            id: ThreadId::from(wire.id),
            title: non_empty(wire.title),
            contact_name: non_empty(wire.contact_name)
                .or_else(|| meta_str(&metadata, "contact_name")),
            last_message: wire.last_message,
            last_message_at: opt_timestamp(wire.last_message_at, "last_message_at")?,
            created_at: opt_timestamp(wire.created_at, "created_at")?,
            lead_score,
            lead_level,
            lead_stage: non_empty(wire.lead_stage).or_else(|| meta_str(&metadata, "lead_stage")),
            human_takeover,
            funnel_id: wire
                .funnel_id
                .map(WireId::into_string)
                .or_else(|| meta_str(&metadata, "funnel_id")),
            stage_id: wire
                .stage_id
                .map(WireId::into_string)
                .or_else(|| meta_str(&metadata, "stage_id")),
            origin: non_empty(wire.origin).or_else(|| meta_str(&metadata, "origin")),
            product: non_empty(wire.product).or_else(|| meta_str(&metadata, "product")),
            automation_status: non_empty(wire.automation_status)
                .or_else(|| meta_str(&metadata, "automation_status")),
            metadata,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub id: WireId,
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub thread_id: Option<WireId>,
    pub role: String,
    #[serde(default)]
    pub is_human: bool,
    #[serde(default)]
    pub content: Option<String>,
    pub created_at: WireTimestamp,
    #[serde(default)]
    pub client_key: Option<String>,
}

impl WireMessage {
    /// Validate into a server message; `thread_id` fills in when the payload omits it
    pub fn into_message(self, thread_id: &ThreadId) -> Result<Message> {
        check_version(self.schema_version)?;

        let id = match &self.id {
            WireId::Text(s) if s.starts_with(TEMP_ID_PREFIX) => {
                return Err(SchemaError::invalid(
                    "id",
                    "server returned a temporary id",
                ))
            }
            other => other
                .as_i64()
                .map(MessageId::Server)
                .ok_or_else(|| SchemaError::invalid("id", format!("not numeric: {:?}", other)))?,
        };

        Ok(Message {
            id,
            thread_id: self
                .thread_id
                .map(ThreadId::from)
                .unwrap_or_else(|| thread_id.clone()),
            role: self.role.parse::<Role>()?,
            is_human: self.is_human,
            content: self.content.unwrap_or_default(),
            created_at: self.created_at.parse("created_at")?,
            client_key: non_empty(self.client_key),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireContact {
    pub id: WireId,
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<Vec<Note>>,
    #[serde(default)]
    pub reminders: Option<Vec<Reminder>>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub created_at: Option<WireTimestamp>,
}

impl TryFrom<WireContact> for Contact {
    type Error = SchemaError;

    fn try_from(wire: WireContact) -> Result<Self> {
        check_version(wire.schema_version)?;

        let mut seen = HashSet::new();
        let tags: Vec<String> = wire
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
            .collect();

        Ok(Contact {
            id: ThreadId::from(wire.id),
            name: non_empty(wire.name),
            email: non_empty(wire.email),
            phone: non_empty(wire.phone),
            tags,
            notes: wire.notes.unwrap_or_default(),
            reminders: wire.reminders.unwrap_or_default(),
            origin: non_empty(wire.origin),
            created_at: opt_timestamp(wire.created_at, "created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire_thread(value: serde_json::Value) -> WireThread {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let minutes = parse_timestamp("2024-01-01T10:00").unwrap();
        let rfc = parse_timestamp("2024-01-01T10:00:00Z").unwrap();
        let offset = parse_timestamp("2024-01-01T07:00:00-03:00").unwrap();
        let spaced = parse_timestamp("2024-01-01 10:00:00").unwrap();

        assert_eq!(minutes, rfc);
        assert_eq!(offset, rfc);
        assert_eq!(spaced, rfc);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_thread_lifts_metadata_fields() {
        let thread = Thread::try_from(wire_thread(json!({
            "id": 3,
            "contact_name": "Bia",
            "metadata": {
                "origin": "site",
                "lead_stage": "aquecido",
                "funnel_id": 7,
                "product": "Curso A"
            }
        })))
        .unwrap();

        assert_eq!(thread.id.as_str(), "3");
        assert_eq!(thread.origin.as_deref(), Some("site"));
        assert_eq!(thread.lead_stage.as_deref(), Some("aquecido"));
        assert_eq!(thread.funnel_id.as_deref(), Some("7"));
        assert_eq!(thread.product.as_deref(), Some("Curso A"));
    }

    #[test]
    fn test_thread_top_level_wins_over_metadata() {
        let thread = Thread::try_from(wire_thread(json!({
            "id": "9",
            "origin": "whatsapp",
            "metadata": { "origin": "site" }
        })))
        .unwrap();

        assert_eq!(thread.origin.as_deref(), Some("whatsapp"));
    }

    #[test]
    fn test_thread_ignores_out_of_range_score() {
        let thread = Thread::try_from(wire_thread(json!({ "id": 1, "lead_score": 140 }))).unwrap();
        assert_eq!(thread.id.as_str(), "1");
        assert_eq!(thread.lead_score, None);

        let negative = Thread::try_from(wire_thread(json!({ "id": 2, "lead_score": -5 }))).unwrap();
        assert_eq!(negative.lead_score, None);
    }

    #[test]
    fn test_thread_rejects_newer_schema() {
        let result = Thread::try_from(wire_thread(json!({ "id": 1, "schema_version": 2 })));
        assert_eq!(
            result.unwrap_err(),
            SchemaError::UnsupportedVersion { found: 2, supported: 1 }
        );
    }

    #[test]
    fn test_thread_unknown_level_is_absent() {
        let thread =
            Thread::try_from(wire_thread(json!({ "id": 1, "lead_level": "fervendo" }))).unwrap();
        assert_eq!(thread.lead_level, None);
    }

    #[test]
    fn test_message_conversion() {
        let wire: WireMessage = serde_json::from_value(json!({
            "id": "42",
            "role": "assistant",
            "content": "Olá!",
            "created_at": "2024-01-01T10:00:02Z"
        }))
        .unwrap();

        let message = wire.into_message(&ThreadId::from(1)).unwrap();
        assert_eq!(message.id, MessageId::Server(42));
        assert_eq!(message.thread_id.as_str(), "1");
        assert_eq!(message.role, Role::Assistant);
        assert!(!message.is_human);
    }

    #[test]
    fn test_message_rejects_temp_id_and_bad_role() {
        let temp: WireMessage = serde_json::from_value(json!({
            "id": "temp-1", "role": "user", "created_at": 0
        }))
        .unwrap();
        assert!(temp.into_message(&ThreadId::from(1)).is_err());

        let bad_role: WireMessage = serde_json::from_value(json!({
            "id": 1, "role": "system", "created_at": 0
        }))
        .unwrap();
        assert!(bad_role.into_message(&ThreadId::from(1)).is_err());
    }

    #[test]
    fn test_contact_conversion_trims_tags() {
        let wire: WireContact = serde_json::from_value(json!({
            "id": 4,
            "name": "Caio",
            "tags": [" vip ", "", "vip"],
            "notes": [{ "id": 1, "content": "Ligar amanhã", "created_at": "2024-02-01T09:00" }]
        }))
        .unwrap();

        let contact = Contact::try_from(wire).unwrap();
        assert_eq!(contact.tags, vec!["vip".to_string()]);
        assert_eq!(contact.notes.len(), 1);
        assert_eq!(contact.notes[0].id, "1");
    }
}
