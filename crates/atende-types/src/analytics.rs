use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::{de_opt_timestamp, de_string_id};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStats {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub active_threads: u64,
    pub tokens_used: Option<u64>,
    #[serde(deserialize_with = "de_opt_timestamp")]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de_opt_timestamp")]
    pub period_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub plan: Option<String>,
    #[serde(deserialize_with = "de_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSummary {
    pub total_threads: u64,
    pub new_threads: u64,
    pub total_contacts: u64,
    /// Fraction in 0.0..=1.0
    pub conversion_rate: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationStatus {
    pub name: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationEvent {
    #[serde(deserialize_with = "de_string_id")]
    pub id: String,
    pub integration: String,
    pub event_type: String,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_stats_defaults_missing_fields() {
        let stats: UsageStats = serde_json::from_str(r#"{"messages_sent": 12}"#).unwrap();
        assert_eq!(stats.messages_sent, 12);
        assert_eq!(stats.messages_received, 0);
        assert!(stats.period_start.is_none());
    }

    #[test]
    fn test_integration_event_numeric_id() {
        let event: IntegrationEvent = serde_json::from_str(
            r#"{"id": 9, "integration": "eduzz", "event_type": "sale", "created_at": "2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(event.id, "9");
        assert!(event.created_at.is_some());
    }
}
