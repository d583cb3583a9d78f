use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier as the backend sends it: sometimes a number, sometimes a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Int(i64),
    Text(String),
}

impl WireId {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            WireId::Int(n) => Some(*n),
            WireId::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn into_string(self) -> String {
        match self {
            WireId::Int(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

/// Conversation identifier. Contacts share it 1:1 with their thread.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "WireId", into = "String")]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric view, used when the backend ids are integers
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<WireId> for ThreadId {
    fn from(id: WireId) -> Self {
        Self(id.into_string())
    }
}

impl From<ThreadId> for String {
    fn from(id: ThreadId) -> Self {
        id.0
    }
}

impl From<i64> for ThreadId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ThreadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ThreadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_id_accepts_number_and_string() {
        let from_number: ThreadId = serde_json::from_str("42").unwrap();
        let from_text: ThreadId = serde_json::from_str("\"t1\"").unwrap();

        assert_eq!(from_number.as_str(), "42");
        assert_eq!(from_number.as_i64(), Some(42));
        assert_eq!(from_text.as_str(), "t1");
        assert_eq!(from_text.as_i64(), None);
    }

    #[test]
    fn test_thread_id_serializes_as_string() {
        let json = serde_json::to_string(&ThreadId::from(7)).unwrap();
        assert_eq!(json, "\"7\"");
    }
}
