use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atende_types::{Contact, Thread};

use crate::classifier::ThreadRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Single active sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + Eq> SortState<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Header click: flips the active key, resets to ascending on a new one
    pub fn toggle(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.flip();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadSortKey {
    Name,
    LastActivity,
    LeadLevel,
    LeadScore,
    Origin,
    Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSortKey {
    Name,
    Email,
    Phone,
    Origin,
    CreatedAt,
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn cmp_opt_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    cmp_text(a.unwrap_or_default(), b.unwrap_or_default())
}

fn compare_threads(key: ThreadSortKey, a: &ThreadRow, b: &ThreadRow) -> Ordering {
    match key {
        ThreadSortKey::Name => cmp_text(&a.thread.display_name(), &b.thread.display_name()),
        ThreadSortKey::LastActivity => a.thread.last_activity().cmp(&b.thread.last_activity()),
        ThreadSortKey::LeadLevel => a.lead.level.ordinal().cmp(&b.lead.level.ordinal()),
        ThreadSortKey::LeadScore => a.lead.score.cmp(&b.lead.score),
        ThreadSortKey::Origin => cmp_opt_text(a.thread.origin.as_deref(), b.thread.origin.as_deref()),
        ThreadSortKey::Stage => {
            cmp_opt_text(a.thread.stage_id.as_deref(), b.thread.stage_id.as_deref())
        }
    }
}

fn compare_contacts(key: ContactSortKey, a: &Contact, b: &Contact) -> Ordering {
    match key {
        ContactSortKey::Name => cmp_text(&a.display_name(), &b.display_name()),
        ContactSortKey::Email => cmp_opt_text(a.email.as_deref(), b.email.as_deref()),
        ContactSortKey::Phone => cmp_opt_text(a.phone.as_deref(), b.phone.as_deref()),
        ContactSortKey::Origin => cmp_opt_text(a.origin.as_deref(), b.origin.as_deref()),
        ContactSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Stable: rows comparing equal keep their input order
pub fn sort_threads(rows: &mut [ThreadRow], state: SortState<ThreadSortKey>) {
    rows.sort_by(|a, b| state.direction.apply(compare_threads(state.key, a, b)));
}

pub fn sort_contacts(contacts: &mut [Contact], state: SortState<ContactSortKey>) {
    contacts.sort_by(|a, b| state.direction.apply(compare_contacts(state.key, a, b)));
}

fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Inbox order: most recent activity first, threads with no timestamp at
/// the end, ties in input order
pub fn sort_by_last_activity(threads: &mut [Thread]) {
    threads.sort_by(|a, b| newest_first(a.last_activity(), b.last_activity()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use atende_types::{LeadClassification, LeadLevel, LeadSource};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn ids(threads: &[Thread]) -> Vec<&str> {
        threads.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_toggle() {
        let mut state = SortState::new(ThreadSortKey::Name);
        state.toggle(ThreadSortKey::Name);
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle(ThreadSortKey::LeadLevel);
        assert_eq!(state.key, ThreadSortKey::LeadLevel);
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_last_activity_descending() {
        let mut first = Thread::new(1);
        first.last_message_at = Some(at(1, 10));
        let mut second = Thread::new(2);
        second.last_message_at = Some(at(2, 9));

        let mut threads = vec![first, second];
        sort_by_last_activity(&mut threads);
        assert_eq!(ids(&threads), vec!["2", "1"]);
    }

    #[test]
    fn test_last_activity_fallbacks_and_ties() {
        let mut created_only = Thread::new(1);
        created_only.created_at = Some(at(3, 0));
        let timeless = Thread::new(2);
        let mut tie_a = Thread::new(3);
        tie_a.last_message_at = Some(at(1, 0));
        let mut tie_b = Thread::new(4);
        tie_b.last_message_at = Some(at(1, 0));

        let mut threads = vec![timeless, tie_a, created_only, tie_b];
        sort_by_last_activity(&mut threads);
        assert_eq!(ids(&threads), vec!["1", "3", "4", "2"]);
    }

    #[test]
    fn test_lead_level_uses_ordinal() {
        let levels = [LeadLevel::Morno, LeadLevel::Desconhecido, LeadLevel::Quente, LeadLevel::Frio];
        let mut rows: Vec<ThreadRow> = levels
            .iter()
            .enumerate()
            .map(|(i, level)| ThreadRow {
                thread: Thread::new(i as i64),
                lead: LeadClassification::from_level(*level, LeadSource::Backend),
            })
            .collect();

        sort_threads(
            &mut rows,
            SortState::new(ThreadSortKey::LeadLevel).with_direction(SortDirection::Desc),
        );
        let sorted: Vec<LeadLevel> = rows.iter().map(|r| r.lead.level).collect();
        assert_eq!(
            sorted,
            vec![LeadLevel::Quente, LeadLevel::Morno, LeadLevel::Frio, LeadLevel::Desconhecido]
        );
    }

    #[test]
    fn test_name_sort_is_case_insensitive() {
        let mut a = Contact::new(1);
        a.name = Some("bruno".to_string());
        let mut b = Contact::new(2);
        b.name = Some("Ana".to_string());

        let mut contacts = vec![a, b];
        sort_contacts(&mut contacts, SortState::new(ContactSortKey::Name));
        assert_eq!(contacts[0].name.as_deref(), Some("Ana"));
    }
}
