use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use crate::error::SchemaError;
use crate::ids::ThreadId;

pub const TEMP_ID_PREFIX: &str = "temp-";

static LAST_TEMP_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Message identifier: assigned by the server, or a client placeholder
/// that lives until the server copy is observed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MessageId {
    Server(i64),
    Temp(String),
}

impl MessageId {
    /// Fresh `temp-<millis>` id; strictly increasing within the process
    pub fn new_temp(at: DateTime<Utc>) -> Self {
        let wanted = at.timestamp_millis();
        let mut last = LAST_TEMP_MILLIS.load(AtomicOrdering::Relaxed);
        loop {
            let next = wanted.max(last + 1);
            match LAST_TEMP_MILLIS.compare_exchange_weak(
                last,
                next,
                AtomicOrdering::Relaxed,
                AtomicOrdering::Relaxed,
            ) {
                Ok(_) => return MessageId::Temp(format!("{}{}", TEMP_ID_PREFIX, next)),
                Err(current) => last = current,
            }
        }
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, MessageId::Temp(_))
    }

    pub fn server(&self) -> Option<i64> {
        match self {
            MessageId::Server(id) => Some(*id),
            MessageId::Temp(_) => None,
        }
    }
}

/// Temporary ids first, then server ids ascending
impl Ord for MessageId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MessageId::Temp(a), MessageId::Temp(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (MessageId::Temp(_), MessageId::Server(_)) => Ordering::Less,
            (MessageId::Server(_), MessageId::Temp(_)) => Ordering::Greater,
            (MessageId::Server(a), MessageId::Server(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for MessageId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Server(id) => write!(f, "{}", id),
            MessageId::Temp(key) => f.write_str(key),
        }
    }
}

impl FromStr for MessageId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with(TEMP_ID_PREFIX) {
            return Ok(MessageId::Temp(s.to_string()));
        }
        s.parse::<i64>()
            .map(MessageId::Server)
            .map_err(|_| SchemaError::invalid("id", format!("not a message id: {:?}", s)))
    }
}

impl TryFrom<String> for MessageId {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(SchemaError::invalid("role", format!("unknown role {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub role: Role,
    /// Written by a human operator during takeover
    pub is_human: bool,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Idempotency key set on optimistic sends and echoed back by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
}

impl Message {
    /// Locally constructed message awaiting its server copy
    pub fn pending(
        thread_id: ThreadId,
        role: Role,
        is_human: bool,
        content: impl Into<String>,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: MessageId::new_temp(created_at),
            thread_id,
            role,
            is_human,
            content: content.into(),
            created_at,
            client_key: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.id.is_temp()
    }

    pub fn server_id(&self) -> Option<i64> {
        self.id.server()
    }
}

/// Body of a send call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
}

impl OutgoingMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            client_key: None,
        }
    }

    pub fn with_client_key(mut self, key: impl Into<String>) -> Self {
        self.client_key = Some(key.into());
        self
    }
}

impl From<&Message> for OutgoingMessage {
    fn from(message: &Message) -> Self {
        Self {
            content: message.content.clone(),
            client_key: message.client_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_ids_sort_before_server_ids() {
        let mut ids = vec![
            MessageId::Server(10),
            MessageId::Temp("temp-1700000000000".to_string()),
            MessageId::Server(2),
        ];
        ids.sort();

        assert!(ids[0].is_temp());
        assert_eq!(ids[1], MessageId::Server(2));
        assert_eq!(ids[2], MessageId::Server(10));
    }

    #[test]
    fn test_new_temp_is_unique_within_same_millisecond() {
        let now = Utc::now();
        let a = MessageId::new_temp(now);
        let b = MessageId::new_temp(now);

        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_message_id_parse() {
        assert_eq!("42".parse::<MessageId>().unwrap(), MessageId::Server(42));
        assert!("temp-123".parse::<MessageId>().unwrap().is_temp());
        assert!("abc".parse::<MessageId>().is_err());
    }

    #[test]
    fn test_pending_message_has_client_key() {
        let msg = Message::pending(ThreadId::from(1), Role::User, false, "oi");
        assert!(msg.is_temporary());
        assert!(msg.client_key.is_some());
        assert_eq!(msg.server_id(), None);
    }
}
