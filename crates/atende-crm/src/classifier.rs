use std::sync::Arc;

use serde::{Deserialize, Serialize};

use atende_store::LeadOverrides;
use atende_types::{LeadClassification, LeadLevel, LeadSource, Message, Thread};

use crate::scorer::{KeywordScorer, LeadScorer};

/// Thread paired with its computed lead classification, as listed in the sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadRow {
    pub thread: Thread,
    pub lead: LeadClassification,
}

/// Map a funnel stage name onto a lead level
pub fn stage_level(stage: &str) -> LeadLevel {
    match stage.trim().to_lowercase().as_str() {
        "quente" | "pos_compra" | "assinante" => LeadLevel::Quente,
        "aquecido" | "fatura_pendente" | "aquecimento" => LeadLevel::Morno,
        _ => LeadLevel::Frio,
    }
}

/// Classification reported by the backend, if it sent a usable one
///
/// A recognised level wins over the numeric score. A zero score is no signal.
pub fn backend_classification(thread: &Thread) -> Option<LeadClassification> {
    if let Some(level) = thread.lead_level.filter(|l| l.is_known()) {
        let score = thread
            .lead_score
            .filter(|s| LeadLevel::from_score(*s) == level)
            .unwrap_or_else(|| level.representative_score());
        return Some(LeadClassification::new(level, score, LeadSource::Backend));
    }

    thread
        .lead_score
        .filter(|score| *score > 0)
        .map(|score| LeadClassification::from_score(score, LeadSource::Backend))
}

/// Computes the lead level of a thread from the strongest available signal:
/// manual override, backend score, funnel stage, then the local scorer.
#[derive(Clone)]
pub struct LeadClassifier {
    scorer: Arc<dyn LeadScorer>,
    overrides: Option<LeadOverrides>,
}

impl Default for LeadClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadClassifier {
    pub fn new() -> Self {
        Self {
            scorer: Arc::new(KeywordScorer::new()),
            overrides: None,
        }
    }

    pub fn with_overrides(mut self, overrides: LeadOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn LeadScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn overrides(&self) -> Option<&LeadOverrides> {
        self.overrides.as_ref()
    }

    /// Never fails; with no signal at all the result is `desconhecido`
    pub fn classify(&self, thread: &Thread, messages: &[Message]) -> LeadClassification {
        if let Some(level) = self.override_for(thread) {
            return LeadClassification::from_level(level, LeadSource::Override);
        }

        if let Some(lead) = backend_classification(thread) {
            return lead;
        }

        if let Some(stage) = thread.lead_stage.as_deref().filter(|s| !s.trim().is_empty()) {
            return LeadClassification::from_level(stage_level(stage), LeadSource::Stage);
        }

        let lead = self.scorer.score(messages);
        if lead.level.is_known() {
            lead
        } else {
            LeadClassification::unknown()
        }
    }

    /// Classify a fetched thread list without message history
    pub fn classify_threads(&self, threads: Vec<Thread>) -> Vec<ThreadRow> {
        threads
            .into_iter()
            .map(|thread| {
                let lead = self.classify(&thread, &[]);
                ThreadRow { thread, lead }
            })
            .collect()
    }

    fn override_for(&self, thread: &Thread) -> Option<LeadLevel> {
        let overrides = self.overrides.as_ref()?;
        match overrides.get(&thread.id) {
            Ok(level) => level,
            Err(e) => {
                tracing::warn!(thread_id = %thread.id, error = %e, "Could not read lead override");
                None
            }
        }
    }
}
