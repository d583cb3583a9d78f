use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atende_types::{IntegrationEvent, IntegrationStatus, LeadClassification, LeadLevel, SalesDay};

/// Lead counts per level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadDistribution {
    pub counts: BTreeMap<LeadLevel, usize>,
    pub total: usize,
}

impl LeadDistribution {
    pub fn from_classifications<'a>(leads: impl IntoIterator<Item = &'a LeadClassification>) -> Self {
        let mut counts: BTreeMap<LeadLevel, usize> =
            LeadLevel::ALL.iter().map(|level| (*level, 0)).collect();
        let mut total = 0;

        for lead in leads {
            *counts.entry(lead.level).or_insert(0) += 1;
            total += 1;
        }

        Self { counts, total }
    }

    pub fn count(&self, level: LeadLevel) -> usize {
        self.counts.get(&level).copied().unwrap_or(0)
    }

    /// Fraction of all leads at `level`, 0.0 when there are none
    pub fn share(&self, level: LeadLevel) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(level) as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesOverview {
    pub total: f64,
    pub orders: u64,
    pub average_ticket: f64,
    pub best_day: Option<SalesDay>,
    pub days: usize,
}

impl SalesOverview {
    pub fn from_days(days: &[SalesDay]) -> Self {
        let total: f64 = days.iter().map(|d| d.total).sum();
        let orders: u64 = days.iter().map(|d| d.count).sum();
        let average_ticket = if orders == 0 {
            0.0
        } else {
            total / orders as f64
        };

        // First of equal days wins
        let best_day = days
            .iter()
            .filter(|d| d.total > 0.0)
            .fold(None::<&SalesDay>, |best, day| match best {
                Some(b) if b.total >= day.total => Some(b),
                _ => Some(day),
            })
            .cloned();

        Self {
            total,
            orders,
            average_ticket,
            best_day,
            days: days.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationHealthEntry {
    pub name: String,
    pub connected: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_event_at: Option<DateTime<Utc>>,
    pub detail: Option<String>,
}

/// Connection state of each integration with its latest event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationHealth {
    pub entries: Vec<IntegrationHealthEntry>,
}

impl IntegrationHealth {
    pub fn new(statuses: &[IntegrationStatus], events: &[IntegrationEvent]) -> Self {
        let mut latest: BTreeMap<String, DateTime<Utc>> = BTreeMap::new();
        for event in events {
            let Some(at) = event.created_at else { continue };
            let slot = latest.entry(event.integration.to_lowercase()).or_insert(at);
            if at > *slot {
                *slot = at;
            }
        }

        let entries = statuses
            .iter()
            .map(|status| IntegrationHealthEntry {
                name: status.name.clone(),
                connected: status.connected,
                last_sync_at: status.last_sync_at,
                last_event_at: latest.get(&status.name.to_lowercase()).copied(),
                detail: status.detail.clone(),
            })
            .collect();

        Self { entries }
    }

    pub fn disconnected(&self) -> impl Iterator<Item = &IntegrationHealthEntry> {
        self.entries.iter().filter(|e| !e.connected)
    }

    pub fn all_connected(&self) -> bool {
        self.entries.iter().all(|e| e.connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atende_types::LeadSource;
    use chrono::{NaiveDate, TimeZone};

    fn day(d: u32, total: f64, count: u64) -> SalesDay {
        SalesDay {
            date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            total,
            count,
        }
    }

    #[test]
    fn test_distribution_counts_every_level() {
        let leads = vec![
            LeadClassification::from_level(LeadLevel::Quente, LeadSource::Backend),
            LeadClassification::from_level(LeadLevel::Quente, LeadSource::Override),
            LeadClassification::unknown(),
        ];
        let dist = LeadDistribution::from_classifications(&leads);

        assert_eq!(dist.total, 3);
        assert_eq!(dist.count(LeadLevel::Quente), 2);
        assert_eq!(dist.count(LeadLevel::Frio), 0);
        assert_eq!(dist.counts.len(), 4);
        assert!((dist.share(LeadLevel::Quente) - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sales_overview() {
        let overview = SalesOverview::from_days(&[day(1, 100.0, 2), day(2, 300.0, 2), day(3, 300.0, 4)]);
        assert_eq!(overview.total, 700.0);
        assert_eq!(overview.orders, 8);
        assert_eq!(overview.average_ticket, 87.5);
        assert_eq!(overview.best_day.map(|d| d.date.to_string()), Some("2024-03-02".to_string()));
    }

    #[test]
    fn test_empty_sales() {
        let overview = SalesOverview::from_days(&[]);
        assert_eq!(overview.average_ticket, 0.0);
        assert!(overview.best_day.is_none());
    }

    #[test]
    fn test_integration_health_latest_event() {
        let statuses = vec![
            IntegrationStatus {
                name: "Eduzz".to_string(),
                connected: true,
                last_sync_at: None,
                detail: None,
            },
            IntegrationStatus {
                name: "whatsapp".to_string(),
                connected: false,
                last_sync_at: None,
                detail: Some("token expirado".to_string()),
            },
        ];
        let event = |id: &str, hour: u32| IntegrationEvent {
            id: id.to_string(),
            integration: "eduzz".to_string(),
            event_type: "sale".to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()),
            payload: serde_json::Value::Null,
        };

        let health = IntegrationHealth::new(&statuses, &[event("1", 9), event("2", 14), event("3", 11)]);
        assert_eq!(
            health.entries[0].last_event_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap())
        );
        assert!(health.entries[1].last_event_at.is_none());
        assert!(!health.all_connected());
        assert_eq!(health.disconnected().count(), 1);
    }
}
