#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use atende_api::{ApiError, InboxApi, MessageStream, PushApi, Result};
use atende_sync::SyncEvent;
use atende_types::{
    AnalyticsSummary, Contact, ContactUpdate, IntegrationEvent, IntegrationStatus, Message,
    MessageId, NewReminder, NewThread, Note, OutgoingMessage, Profile, Reminder, ReminderUpdate,
    Role, SalesDay, Thread, ThreadId, ThreadUpdate, UsageStats,
};

/// In-memory backend that records what the client sent
#[derive(Default)]
pub struct FakeInbox {
    pub threads: Mutex<Vec<Thread>>,
    pub messages: Mutex<HashMap<ThreadId, Vec<Message>>>,
    pub posted: Mutex<Vec<(&'static str, ThreadId, OutgoingMessage)>>,
    pub updates: Mutex<Vec<(ThreadId, ThreadUpdate)>>,
    pub audio: Mutex<Vec<(ThreadId, String)>>,
    pub pushed: Mutex<Vec<Message>>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
    pub get_calls: AtomicUsize,
    pub calls_by_thread: Mutex<HashMap<ThreadId, usize>>,
    pub load_delays: Mutex<HashMap<ThreadId, Duration>>,
    pub stream_opens: AtomicUsize,
    next_id: AtomicI64,
}

impl FakeInbox {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        }
    }

    /// Store a message as the server would, returning its id
    pub fn add_message(&self, thread_id: &ThreadId, role: Role, content: &str, at: DateTime<Utc>) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = Message {
            id: MessageId::Server(id),
            thread_id: thread_id.clone(),
            role,
            is_human: false,
            content: content.to_string(),
            created_at: at,
            client_key: None,
        };
        self.messages
            .lock()
            .unwrap()
            .entry(thread_id.clone())
            .or_default()
            .push(message);
        id
    }

    /// Make every `get_messages` for `thread_id` take `delay`
    pub fn delay_loads(&self, thread_id: &ThreadId, delay: Duration) {
        self.load_delays
            .lock()
            .unwrap()
            .insert(thread_id.clone(), delay);
    }

    pub fn calls_for(&self, thread_id: &ThreadId) -> usize {
        self.calls_by_thread
            .lock()
            .unwrap()
            .get(thread_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn posted(&self) -> Vec<(&'static str, ThreadId, OutgoingMessage)> {
        self.posted.lock().unwrap().clone()
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::from_status(
                503,
                r#"{"detail": "WhatsApp desconectado"}"#.to_string(),
            ));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ApiError::from_status(500, String::new()));
        }
        Ok(())
    }

    fn record(&self, endpoint: &'static str, thread_id: &ThreadId, message: OutgoingMessage) -> Result<()> {
        self.check_write()?;
        self.posted
            .lock()
            .unwrap()
            .push((endpoint, thread_id.clone(), message));
        Ok(())
    }
}

fn unsupported<T>() -> Result<T> {
    Err(ApiError::from_status(404, String::new()))
}

#[async_trait]
impl InboxApi for FakeInbox {
    async fn list_threads(&self) -> Result<Vec<Thread>> {
        self.check_read()?;
        Ok(self.threads.lock().unwrap().clone())
    }

    async fn create_thread(&self, _thread: NewThread) -> Result<Thread> {
        unsupported()
    }

    async fn delete_thread(&self, _thread_id: &ThreadId) -> Result<()> {
        unsupported()
    }

    async fn update_thread(&self, thread_id: &ThreadId, update: ThreadUpdate) -> Result<Thread> {
        self.check_write()?;
        self.updates
            .lock()
            .unwrap()
            .push((thread_id.clone(), update.clone()));
        let mut thread = Thread::new(thread_id.clone());
        thread.human_takeover = update.human_takeover.unwrap_or_default();
        Ok(thread)
    }

    async fn thread_by_contact(&self, _contact_id: &ThreadId) -> Result<Option<Thread>> {
        Ok(None)
    }

    async fn get_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_thread
            .lock()
            .unwrap()
            .entry(thread_id.clone())
            .or_default() += 1;
        let delay = self.load_delays.lock().unwrap().get(thread_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_read()?;
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn post_message(&self, thread_id: &ThreadId, message: OutgoingMessage) -> Result<()> {
        self.record("messages", thread_id, message)
    }

    async fn post_human_reply(&self, thread_id: &ThreadId, message: OutgoingMessage) -> Result<()> {
        self.record("human-reply", thread_id, message)
    }

    async fn send_audio(&self, thread_id: &ThreadId, audio_id: &str) -> Result<()> {
        self.check_write()?;
        self.audio
            .lock()
            .unwrap()
            .push((thread_id.clone(), audio_id.to_string()));
        Ok(())
    }

    async fn get_contact(&self, _contact_id: &ThreadId) -> Result<Contact> {
        unsupported()
    }

    async fn update_contact(&self, _contact_id: &ThreadId, _update: ContactUpdate) -> Result<Contact> {
        unsupported()
    }

    async fn add_tag(&self, _contact_id: &ThreadId, _tag: &str) -> Result<()> {
        unsupported()
    }

    async fn remove_tag(&self, _contact_id: &ThreadId, _tag: &str) -> Result<()> {
        unsupported()
    }

    async fn add_note(&self, _contact_id: &ThreadId, _content: &str) -> Result<Note> {
        unsupported()
    }

    async fn delete_note(&self, _contact_id: &ThreadId, _note_id: &str) -> Result<()> {
        unsupported()
    }

    async fn create_reminder(&self, _contact_id: &ThreadId, _reminder: NewReminder) -> Result<Reminder> {
        unsupported()
    }

    async fn update_reminder(
        &self,
        _contact_id: &ThreadId,
        _reminder_id: &str,
        _update: ReminderUpdate,
    ) -> Result<Reminder> {
        unsupported()
    }

    async fn usage_stats(&self) -> Result<UsageStats> {
        unsupported()
    }

    async fn profile(&self) -> Result<Profile> {
        unsupported()
    }

    async fn analytics_summary(&self) -> Result<AnalyticsSummary> {
        unsupported()
    }

    async fn sales_by_day(&self, _days: u32) -> Result<Vec<SalesDay>> {
        unsupported()
    }

    async fn integration_status(&self) -> Result<Vec<IntegrationStatus>> {
        unsupported()
    }

    async fn recent_integration_events(&self, _limit: u32) -> Result<Vec<IntegrationEvent>> {
        unsupported()
    }
}

/// Streams whatever is in `pushed`, then closes
#[async_trait]
impl PushApi for FakeInbox {
    async fn message_stream(&self, _thread_id: &ThreadId) -> Result<MessageStream> {
        self.stream_opens.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<Message>> = self.pushed.lock().unwrap().drain(..).map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

/// Next event matching `predicate`, skipping the rest
pub async fn wait_for<F>(rx: &mut mpsc::Receiver<SyncEvent>, mut predicate: F) -> SyncEvent
where
    F: FnMut(&SyncEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            match rx.recv().await {
                Some(event) if predicate(&event) => return event,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for sync event")
}
