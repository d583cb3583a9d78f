use std::sync::Arc;

use atende_types::{LeadLevel, ThreadId};

use crate::error::Result;
use crate::trait_store::KeyValueStore;

pub const LEAD_OVERRIDE_PREFIX: &str = "lead_override_";

/// Manual lead level per thread, kept client-side
#[derive(Clone)]
pub struct LeadOverrides {
    store: Arc<dyn KeyValueStore>,
}

impl LeadOverrides {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(thread_id: &ThreadId) -> String {
        format!("{}{}", LEAD_OVERRIDE_PREFIX, thread_id)
    }

    /// Stored level, if any. `desconhecido` and unreadable values count as no override.
    pub fn get(&self, thread_id: &ThreadId) -> Result<Option<LeadLevel>> {
        let raw = self.store.get(&Self::key(thread_id))?;
        Ok(raw
            .and_then(|value| value.parse::<LeadLevel>().ok())
            .filter(|level| level.is_known()))
    }

    /// Setting `Desconhecido` clears the override
    pub fn set(&self, thread_id: &ThreadId, level: LeadLevel) -> Result<()> {
        if !level.is_known() {
            return self.clear(thread_id);
        }
        tracing::debug!(thread_id = %thread_id, level = %level, "Setting lead override");
        self.store.set(&Self::key(thread_id), level.as_str())
    }

    pub fn clear(&self, thread_id: &ThreadId) -> Result<()> {
        tracing::debug!(thread_id = %thread_id, "Clearing lead override");
        self.store.delete(&Self::key(thread_id))
    }

    /// Every thread with an effective override
    pub fn all(&self) -> Result<Vec<(ThreadId, LeadLevel)>> {
        let mut overrides = Vec::new();
        for key in self.store.keys(LEAD_OVERRIDE_PREFIX)? {
            let thread_id = ThreadId::from(&key[LEAD_OVERRIDE_PREFIX.len()..]);
            if let Some(level) = self.get(&thread_id)? {
                overrides.push((thread_id, level));
            }
        }
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn overrides() -> (Arc<MemoryStore>, LeadOverrides) {
        let store = Arc::new(MemoryStore::new());
        let overrides = LeadOverrides::new(store.clone());
        (store, overrides)
    }

    #[test]
    fn test_set_and_clear() {
        let (store, overrides) = overrides();
        let t1 = ThreadId::from("t1");

        overrides.set(&t1, LeadLevel::Quente).unwrap();
        assert_eq!(overrides.get(&t1).unwrap(), Some(LeadLevel::Quente));
        assert_eq!(
            store.get("lead_override_t1").unwrap().as_deref(),
            Some("quente")
        );

        overrides.clear(&t1).unwrap();
        assert_eq!(overrides.get(&t1).unwrap(), None);
    }

    #[test]
    fn test_unknown_values_read_as_absent() {
        let (store, overrides) = overrides();
        store.set("lead_override_1", "desconhecido").unwrap();
        store.set("lead_override_2", "lukewarm").unwrap();

        assert_eq!(overrides.get(&ThreadId::from(1)).unwrap(), None);
        assert_eq!(overrides.get(&ThreadId::from(2)).unwrap(), None);
    }

    #[test]
    fn test_setting_desconhecido_clears() {
        let (_, overrides) = overrides();
        let id = ThreadId::from(3);

        overrides.set(&id, LeadLevel::Frio).unwrap();
        overrides.set(&id, LeadLevel::Desconhecido).unwrap();
        assert_eq!(overrides.get(&id).unwrap(), None);
    }

    #[test]
    fn test_all_lists_effective_overrides() {
        let (store, overrides) = overrides();
        overrides.set(&ThreadId::from(1), LeadLevel::Morno).unwrap();
        overrides.set(&ThreadId::from(2), LeadLevel::Quente).unwrap();
        store.set("lead_override_3", "garbage").unwrap();

        let all = overrides.all().unwrap();
        assert_eq!(
            all,
            vec![
                (ThreadId::from(1), LeadLevel::Morno),
                (ThreadId::from(2), LeadLevel::Quente)
            ]
        );
    }
}
