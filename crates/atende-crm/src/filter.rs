use atende_types::{Contact, LeadLevel};

use crate::classifier::ThreadRow;

fn contains_folded(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn equals_if_set(wanted: &Option<String>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual.map(|a| a == wanted).unwrap_or(false),
    }
}

/// Sidebar search and categorical filters. Unset fields match everything;
/// set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadFilter {
    pub search: Option<String>,
    pub lead_level: Option<LeadLevel>,
    pub origin: Option<String>,
    pub funnel_id: Option<String>,
    pub stage_id: Option<String>,
    pub product: Option<String>,
    pub automation_status: Option<String>,
}

impl ThreadFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.search = (!query.trim().is_empty()).then_some(query);
        self
    }

    pub fn lead_level(mut self, level: LeadLevel) -> Self {
        self.lead_level = Some(level);
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn funnel(mut self, funnel_id: impl Into<String>) -> Self {
        self.funnel_id = Some(funnel_id.into());
        self
    }

    pub fn stage(mut self, stage_id: impl Into<String>) -> Self {
        self.stage_id = Some(stage_id.into());
        self
    }

    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn automation_status(mut self, status: impl Into<String>) -> Self {
        self.automation_status = Some(status.into());
        self
    }

    pub fn matches(&self, row: &ThreadRow) -> bool {
        let thread = &row.thread;

        if let Some(query) = &self.search {
            let needle = query.trim().to_lowercase();
            let hit = thread.display_name().to_lowercase().contains(&needle)
                || contains_folded(thread.last_message.as_deref(), &needle);
            if !hit {
                return false;
            }
        }

        if let Some(level) = self.lead_level {
            if row.lead.level != level {
                return false;
            }
        }

        equals_if_set(&self.origin, thread.origin.as_deref())
            && equals_if_set(&self.funnel_id, thread.funnel_id.as_deref())
            && equals_if_set(&self.stage_id, thread.stage_id.as_deref())
            && equals_if_set(&self.product, thread.product.as_deref())
            && equals_if_set(&self.automation_status, thread.automation_status.as_deref())
    }

    /// Matching rows, in input order
    pub fn apply(&self, rows: &[ThreadRow]) -> Vec<ThreadRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// Contacts table filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFilter {
    pub search: Option<String>,
    pub origin: Option<String>,
    pub tag: Option<String>,
}

impl ContactFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.search = (!query.trim().is_empty()).then_some(query);
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        if let Some(query) = &self.search {
            let needle = query.trim().to_lowercase();
            let hit = contains_folded(contact.name.as_deref(), &needle)
                || contains_folded(contact.email.as_deref(), &needle)
                || contains_folded(contact.phone.as_deref(), &needle);
            if !hit {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            if !contact.has_tag(tag) {
                return false;
            }
        }

        equals_if_set(&self.origin, contact.origin.as_deref())
    }

    pub fn apply(&self, contacts: &[Contact]) -> Vec<Contact> {
        contacts
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect()
    }
}
