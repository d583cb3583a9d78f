use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use atende_types::{
    AnalyticsSummary, Contact, ContactUpdate, IntegrationEvent, IntegrationStatus, Message,
    NewReminder, NewThread, Note, OutgoingMessage, Profile, Reminder, ReminderUpdate, SalesDay,
    Thread, ThreadId, ThreadUpdate, UsageStats,
};

use crate::error::Result;

pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// The inbox backend, consumed as a black box
///
/// Every call is a full request/response round trip; there is no delta
/// protocol. Implementations validate payloads into domain types.
#[async_trait]
pub trait InboxApi: Send + Sync {
    // Threads
    async fn list_threads(&self) -> Result<Vec<Thread>>;

    async fn create_thread(&self, thread: NewThread) -> Result<Thread>;

    async fn delete_thread(&self, thread_id: &ThreadId) -> Result<()>;

    async fn update_thread(&self, thread_id: &ThreadId, update: ThreadUpdate) -> Result<Thread>;

    /// `None` when the contact has no conversation yet
    async fn thread_by_contact(&self, contact_id: &ThreadId) -> Result<Option<Thread>>;

    // Messages
    async fn get_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>>;

    /// Post as the end user; the assistant replies asynchronously
    async fn post_message(&self, thread_id: &ThreadId, message: OutgoingMessage) -> Result<()>;

    /// Post as the operator who took the conversation over
    async fn post_human_reply(&self, thread_id: &ThreadId, message: OutgoingMessage)
        -> Result<()>;

    async fn send_audio(&self, thread_id: &ThreadId, audio_id: &str) -> Result<()>;

    // Contacts
    async fn get_contact(&self, contact_id: &ThreadId) -> Result<Contact>;

    async fn update_contact(&self, contact_id: &ThreadId, update: ContactUpdate)
        -> Result<Contact>;

    async fn add_tag(&self, contact_id: &ThreadId, tag: &str) -> Result<()>;

    async fn remove_tag(&self, contact_id: &ThreadId, tag: &str) -> Result<()>;

    async fn add_note(&self, contact_id: &ThreadId, content: &str) -> Result<Note>;

    async fn delete_note(&self, contact_id: &ThreadId, note_id: &str) -> Result<()>;

    async fn create_reminder(&self, contact_id: &ThreadId, reminder: NewReminder)
        -> Result<Reminder>;

    async fn update_reminder(
        &self,
        contact_id: &ThreadId,
        reminder_id: &str,
        update: ReminderUpdate,
    ) -> Result<Reminder>;

    // Analytics
    async fn usage_stats(&self) -> Result<UsageStats>;

    async fn profile(&self) -> Result<Profile>;

    async fn analytics_summary(&self) -> Result<AnalyticsSummary>;

    async fn sales_by_day(&self, days: u32) -> Result<Vec<SalesDay>>;

    async fn integration_status(&self) -> Result<Vec<IntegrationStatus>>;

    async fn recent_integration_events(&self, limit: u32) -> Result<Vec<IntegrationEvent>>;
}

/// Server push of new messages for one thread
#[async_trait]
pub trait PushApi: Send + Sync {
    async fn message_stream(&self, thread_id: &ThreadId) -> Result<MessageStream>;
}
