use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use atende_api::InboxApi;
use atende_crm::{sort_by_last_activity, LeadClassifier, ThreadRow};

use crate::error::Result;
use crate::events::SyncEvent;

/// Periodic refresh of the sidebar list and its lead levels
///
/// Runs independently of the active thread. Failed polls are logged and
/// the previous list is kept.
pub struct ThreadListSync {
    api: Arc<dyn InboxApi>,
    classifier: LeadClassifier,
    interval: Duration,
    rows: Arc<RwLock<Vec<ThreadRow>>>,
    events: mpsc::Sender<SyncEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadListSync {
    pub fn new(
        api: Arc<dyn InboxApi>,
        classifier: LeadClassifier,
        interval: Duration,
        events: mpsc::Sender<SyncEvent>,
    ) -> Self {
        Self {
            api,
            classifier,
            interval,
            rows: Arc::new(RwLock::new(Vec::new())),
            events,
            task: Mutex::new(None),
        }
    }

    pub async fn rows(&self) -> Vec<ThreadRow> {
        self.rows.read().await.clone()
    }

    /// Reclassify the cached list, e.g. after an override changed
    pub async fn reclassify(&self) -> Vec<ThreadRow> {
        let rows = {
            let mut rows = self.rows.write().await;
            for row in rows.iter_mut() {
                row.lead = self.classifier.classify(&row.thread, &[]);
            }
            rows.clone()
        };
        let _ = self
            .events
            .send(SyncEvent::Threads { rows: rows.clone() })
            .await;
        rows
    }

    pub async fn refresh(&self) -> Result<Vec<ThreadRow>> {
        refresh_rows(&*self.api, &self.classifier, &self.rows, &self.events).await
    }

    /// Start polling; the first refresh runs immediately
    pub fn start(&self) {
        let api = Arc::clone(&self.api);
        let classifier = self.classifier.clone();
        let rows = Arc::clone(&self.rows);
        let events = self.events.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = refresh_rows(&*api, &classifier, &rows, &events).await {
                    tracing::debug!(error = %e, "Thread list poll failed");
                }
            }
        });

        let mut slot = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
        tracing::info!(interval_ms = period.as_millis() as u64, "Thread list polling started");
    }

    pub fn stop(&self) {
        let mut slot = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

impl Drop for ThreadListSync {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn refresh_rows(
    api: &dyn InboxApi,
    classifier: &LeadClassifier,
    rows: &RwLock<Vec<ThreadRow>>,
    events: &mpsc::Sender<SyncEvent>,
) -> Result<Vec<ThreadRow>> {
    let mut threads = api.list_threads().await?;
    sort_by_last_activity(&mut threads);
    let fresh = classifier.classify_threads(threads);

    *rows.write().await = fresh.clone();
    tracing::debug!(count = fresh.len(), "Thread list refreshed");

    let _ = events
        .send(SyncEvent::Threads {
            rows: fresh.clone(),
        })
        .await;
    Ok(fresh)
}
