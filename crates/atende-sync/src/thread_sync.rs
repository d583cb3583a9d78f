use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use atende_api::{ApiError, InboxApi};
use atende_types::{Message, OutgoingMessage, SyncConfig, Thread, ThreadId, ThreadUpdate};

use crate::conversation::{Banner, Conversation};
use crate::error::{Result, SyncError};
use crate::events::SyncEvent;
use crate::feed::{MessageFeed, PollingFeed};

const EVENT_BUFFER: usize = 1000;

/// Keeps the active conversation in sync with the backend
///
/// Selecting a thread loads its messages and starts a background task
/// that merges every feed batch into the shared [`Conversation`]. Sends
/// are optimistic. State changes are published as [`SyncEvent`]s.
pub struct ThreadSync {
    api: Arc<dyn InboxApi>,
    feed: Arc<dyn MessageFeed>,
    config: SyncConfig,
    state: Arc<RwLock<Conversation>>,
    events: mpsc::Sender<SyncEvent>,
    generation: AtomicU64,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadSync {
    pub fn new(
        api: Arc<dyn InboxApi>,
        feed: Arc<dyn MessageFeed>,
        config: SyncConfig,
    ) -> (Self, mpsc::Receiver<SyncEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let sync = Self {
            api,
            feed,
            config,
            state: Arc::new(RwLock::new(Conversation::new())),
            events: tx,
            generation: AtomicU64::new(0),
            task: Mutex::new(None),
        };
        (sync, rx)
    }

    /// Sync driven by a [`PollingFeed`] at the configured interval
    pub fn polling(api: Arc<dyn InboxApi>, config: SyncConfig) -> (Self, mpsc::Receiver<SyncEvent>) {
        let feed = Arc::new(PollingFeed::new(Arc::clone(&api), config.message_poll_interval));
        Self::new(api, feed, config)
    }

    /// Sender for other producers that publish on the same channel
    pub fn event_sender(&self) -> mpsc::Sender<SyncEvent> {
        self.events.clone()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub async fn snapshot(&self) -> Conversation {
        self.state.read().await.clone()
    }

    pub async fn active_thread(&self) -> Option<ThreadId> {
        self.state.read().await.thread_id.clone()
    }

    pub async fn select_thread(&self, thread: &Thread) -> Result<()> {
        self.select(thread.id.clone(), thread.human_takeover).await
    }

    /// Make `thread_id` the active thread
    ///
    /// The previous feed task is aborted and the generation bumped under
    /// one lock, so a slower overlapping selection can never install its
    /// feed over this one. A failed initial load raises the banner but
    /// polling still starts.
    pub async fn select(&self, thread_id: ThreadId, takeover: bool) -> Result<()> {
        let generation = {
            let mut slot = self.task.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = slot.take() {
                previous.abort();
            }
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        {
            let mut state = self.state.write().await;
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(thread_id = %thread_id, generation, "Selection superseded before reset");
                return Ok(());
            }
            state.reset(thread_id.clone(), generation, takeover);
        }

        tracing::info!(thread_id = %thread_id, generation, "Selected thread");
        self.emit(SyncEvent::Selected {
            thread_id: thread_id.clone(),
            generation,
        })
        .await;
        self.emit(SyncEvent::Takeover {
            thread_id: thread_id.clone(),
            active: takeover,
        })
        .await;

        let loaded = self.api.get_messages(&thread_id).await;

        let handle = self.spawn_feed(thread_id.clone(), generation);
        self.install_task(generation, handle);

        match loaded {
            Ok(messages) => {
                apply_batch(
                    &self.state,
                    &self.events,
                    &thread_id,
                    generation,
                    messages,
                    self.config.reconcile_window_ms(),
                )
                .await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(thread_id = %thread_id, error = %e, "Initial message load failed");
                self.raise_banner(generation, Banner::error(e.user_message()))
                    .await;
                Err(e.into())
            }
        }
    }

    fn spawn_feed(&self, thread_id: ThreadId, generation: u64) -> JoinHandle<()> {
        let mut batches = self.feed.batches(thread_id.clone());
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let window_ms = self.config.reconcile_window_ms();

        tokio::spawn(async move {
            while let Some(batch) = batches.next().await {
                let current =
                    apply_batch(&state, &events, &thread_id, generation, batch, window_ms).await;
                if !current {
                    break;
                }
            }
            tracing::debug!(thread_id = %thread_id, generation, "Message feed stopped");
        })
    }

    /// Install the feed task of `generation` unless a newer selection
    /// already happened, in which case the task is aborted instead
    fn install_task(&self, generation: u64, handle: JoinHandle<()>) {
        let mut slot = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Selection superseded, dropping its feed");
            handle.abort();
            return;
        }
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Abort the feed task of the active thread
    pub fn stop(&self) {
        let mut slot = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.take() {
            previous.abort();
        }
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.state.write().await.input = text.into();
    }

    /// Send what is in the composer
    pub async fn send(&self) -> Result<()> {
        let (thread_id, generation, pending, takeover) = {
            let mut state = self.state.write().await;
            let thread_id = state.thread_id.clone().ok_or(SyncError::NoActiveThread)?;
            let pending = state.begin_send().ok_or(SyncError::EmptyMessage)?;
            (thread_id, state.generation, pending, state.takeover)
        };

        self.publish_messages(generation).await;
        if !takeover {
            self.emit(SyncEvent::Typing {
                thread_id: thread_id.clone(),
                active: true,
            })
            .await;
        }

        let outgoing = OutgoingMessage::from(&pending);
        let sent = if takeover {
            self.api.post_human_reply(&thread_id, outgoing).await
        } else {
            self.api.post_message(&thread_id, outgoing).await
        };

        match sent {
            Ok(()) => {
                tracing::debug!(thread_id = %thread_id, id = %pending.id, "Message posted");
                Ok(())
            }
            Err(e) => {
                self.rollback_send(&thread_id, generation, &pending, &e)
                    .await;
                Err(e.into())
            }
        }
    }

    /// Put `text` in the composer and send it
    pub async fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.set_input(text).await;
        self.send().await
    }

    async fn rollback_send(
        &self,
        thread_id: &ThreadId,
        generation: u64,
        pending: &Message,
        error: &ApiError,
    ) {
        tracing::warn!(thread_id = %thread_id, error = %error, "Send failed, rolling back");

        let banner = {
            let mut state = self.state.write().await;
            if !state.is_current(generation) {
                return;
            }
            state.rollback(pending, error.user_message());
            state.banner.clone()
        };

        self.publish_messages(generation).await;
        self.emit(SyncEvent::Typing {
            thread_id: thread_id.clone(),
            active: false,
        })
        .await;
        self.emit(SyncEvent::Banner {
            thread_id: Some(thread_id.clone()),
            banner,
        })
        .await;
    }

    /// Banner retry action; true when the composer has text to send again
    pub async fn retry(&self) -> bool {
        let (thread_id, ready) = {
            let mut state = self.state.write().await;
            (state.thread_id.clone(), state.retry())
        };
        self.emit(SyncEvent::Banner {
            thread_id,
            banner: None,
        })
        .await;
        ready
    }

    pub async fn dismiss_banner(&self) {
        let thread_id = {
            let mut state = self.state.write().await;
            state.dismiss_banner();
            state.thread_id.clone()
        };
        self.emit(SyncEvent::Banner {
            thread_id,
            banner: None,
        })
        .await;
    }

    /// Flip human takeover right away and confirm with the backend,
    /// restoring the previous value if that fails
    pub async fn force_takeover(&self, active: bool) -> Result<()> {
        let (thread_id, generation, previous) = {
            let mut state = self.state.write().await;
            let thread_id = state.thread_id.clone().ok_or(SyncError::NoActiveThread)?;
            (thread_id, state.generation, state.set_takeover(active))
        };
        self.emit(SyncEvent::Takeover {
            thread_id: thread_id.clone(),
            active,
        })
        .await;

        match self
            .api
            .update_thread(&thread_id, ThreadUpdate::takeover(active))
            .await
        {
            Ok(_) => {
                tracing::info!(thread_id = %thread_id, active, "Takeover updated");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(thread_id = %thread_id, error = %e, "Takeover update failed, rolling back");
                let restored = {
                    let mut state = self.state.write().await;
                    if state.is_current(generation) {
                        state.set_takeover(previous);
                        true
                    } else {
                        false
                    }
                };
                if restored {
                    self.emit(SyncEvent::Takeover {
                        thread_id: thread_id.clone(),
                        active: previous,
                    })
                    .await;
                    self.raise_banner(generation, Banner::error(e.user_message()))
                        .await;
                }
                Err(e.into())
            }
        }
    }

    /// Post a previously uploaded audio; it shows up with the next merge
    pub async fn send_audio(&self, audio_id: &str) -> Result<()> {
        let (thread_id, generation) = {
            let state = self.state.read().await;
            let thread_id = state.thread_id.clone().ok_or(SyncError::NoActiveThread)?;
            (thread_id, state.generation)
        };

        if let Err(e) = self.api.send_audio(&thread_id, audio_id).await {
            tracing::warn!(thread_id = %thread_id, error = %e, "Audio send failed");
            self.raise_banner(generation, Banner::error(e.user_message()))
                .await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Fetch and merge now instead of waiting for the feed
    pub async fn refresh(&self) -> Result<()> {
        let (thread_id, generation) = {
            let state = self.state.read().await;
            let thread_id = state.thread_id.clone().ok_or(SyncError::NoActiveThread)?;
            (thread_id, state.generation)
        };

        let messages = self.api.get_messages(&thread_id).await?;
        apply_batch(
            &self.state,
            &self.events,
            &thread_id,
            generation,
            messages,
            self.config.reconcile_window_ms(),
        )
        .await;
        Ok(())
    }

    async fn raise_banner(&self, generation: u64, banner: Banner) {
        let thread_id = {
            let mut state = self.state.write().await;
            if !state.is_current(generation) {
                return;
            }
            state.banner = Some(banner.clone());
            state.thread_id.clone()
        };
        self.emit(SyncEvent::Banner {
            thread_id,
            banner: Some(banner),
        })
        .await;
    }

    async fn publish_messages(&self, generation: u64) {
        let snapshot = {
            let state = self.state.read().await;
            match (&state.thread_id, state.is_current(generation)) {
                (Some(thread_id), true) => Some((thread_id.clone(), state.messages.clone())),
                _ => None,
            }
        };
        if let Some((thread_id, messages)) = snapshot {
            self.emit(SyncEvent::Messages {
                thread_id,
                messages,
            })
            .await;
        }
    }

    async fn emit(&self, event: SyncEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event).await;
    }
}

impl Drop for ThreadSync {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Merge one batch into the shared state; false once the selection moved on
async fn apply_batch(
    state: &RwLock<Conversation>,
    events: &mpsc::Sender<SyncEvent>,
    thread_id: &ThreadId,
    generation: u64,
    batch: Vec<Message>,
    window_ms: i64,
) -> bool {
    let (outcome, messages) = {
        let mut state = state.write().await;
        match state.apply_batch(generation, &batch, window_ms) {
            Some(outcome) => (outcome, state.messages.clone()),
            None => {
                tracing::debug!(thread_id = %thread_id, generation, "Discarding stale batch");
                return false;
            }
        }
    };

    if outcome.changed {
        let _ = events
            .send(SyncEvent::Messages {
                thread_id: thread_id.clone(),
                messages,
            })
            .await;
    }
    if outcome.typing_cleared {
        let _ = events
            .send(SyncEvent::Typing {
                thread_id: thread_id.clone(),
                active: false,
            })
            .await;
    }
    true
}
