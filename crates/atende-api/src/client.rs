// HTTP implementation of the inbox backend contract

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::Duration;

use atende_types::{
    AnalyticsSummary, Contact, ContactUpdate, IntegrationEvent, IntegrationStatus, Message,
    NewReminder, NewThread, Note, OutgoingMessage, Profile, Reminder, ReminderUpdate, SalesDay,
    Thread, ThreadId, ThreadUpdate, UsageStats, WireContact, WireMessage, WireThread,
};

use crate::buffer_utils::parse_sse_stream;
use crate::error::{ApiError, Result};
use crate::payload::decode_list;
use crate::push::MessageEventParser;
use crate::traits::{InboxApi, MessageStream, PushApi};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("atende/", env!("CARGO_PKG_VERSION"));

pub struct HttpInboxClient {
    http_client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<String>>,
    timeout: Duration,
}

impl HttpInboxClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> HttpInboxClientBuilder {
        HttpInboxClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Replace the bearer token used for subsequent requests
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token.filter(|t| !t.trim().is_empty());
        }
    }

    pub fn has_token(&self) -> bool {
        self.current_token().is_some()
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    /// Base URL plus percent-encoded path segments
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("Base URL cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        tracing::debug!(method = %method, url = %url, "Inbox API request");

        let mut builder = self.http_client.request(method, url).timeout(self.timeout);
        if let Some(token) = self.current_token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, body = %body, "Inbox API request failed");
        Err(ApiError::from_status(status.as_u16(), body))
    }

    async fn fetch_text(&self, builder: RequestBuilder) -> Result<String> {
        Ok(self.send(builder).await?.text().await?)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.fetch_text(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await?;
        Ok(())
    }

    async fn fetch_thread(&self, builder: RequestBuilder) -> Result<Thread> {
        let wire: WireThread = self.fetch_json(builder).await?;
        Ok(Thread::try_from(wire)?)
    }

    async fn fetch_contact(&self, builder: RequestBuilder) -> Result<Contact> {
        let wire: WireContact = self.fetch_json(builder).await?;
        Ok(Contact::try_from(wire)?)
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl InboxApi for HttpInboxClient {
    async fn list_threads(&self) -> Result<Vec<Thread>> {
        let body = self.fetch_text(self.request(Method::GET, &["threads"])?).await?;
        Ok(decode_list::<WireThread, _, _>(&body, "thread", Thread::try_from)?)
    }

    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        let builder = self.request(Method::POST, &["threads"])?.json(&thread);
        self.fetch_thread(builder).await
    }

    async fn delete_thread(&self, thread_id: &ThreadId) -> Result<()> {
        self.execute(self.request(Method::DELETE, &["threads", thread_id.as_str()])?)
            .await
    }

    async fn update_thread(&self, thread_id: &ThreadId, update: ThreadUpdate) -> Result<Thread> {
        let builder = self
            .request(Method::PATCH, &["threads", thread_id.as_str()])?
            .json(&update);
        self.fetch_thread(builder).await
    }

    async fn thread_by_contact(&self, contact_id: &ThreadId) -> Result<Option<Thread>> {
        let builder = self.request(Method::GET, &["threads", "by-contact", contact_id.as_str()])?;

        let body = match self.fetch_text(builder).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let wire: Option<WireThread> = serde_json::from_str(&body)?;
        Ok(wire.map(Thread::try_from).transpose()?)
    }

    async fn get_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        let builder = self.request(Method::GET, &["threads", thread_id.as_str(), "messages"])?;
        let body = self.fetch_text(builder).await?;
        Ok(decode_list::<WireMessage, _, _>(&body, "message", |wire| {
            wire.into_message(thread_id)
        })?)
    }

    async fn post_message(&self, thread_id: &ThreadId, message: OutgoingMessage) -> Result<()> {
        let builder = self
            .request(Method::POST, &["threads", thread_id.as_str(), "messages"])?
            .json(&message);
        self.execute(builder).await
    }

    async fn post_human_reply(
        &self,
        thread_id: &ThreadId,
        message: OutgoingMessage,
    ) -> Result<()> {
        let builder = self
            .request(Method::POST, &["threads", thread_id.as_str(), "human-reply"])?
            .json(&message);
        self.execute(builder).await
    }

    async fn send_audio(&self, thread_id: &ThreadId, audio_id: &str) -> Result<()> {
        let builder = self
            .request(Method::POST, &["threads", thread_id.as_str(), "audio"])?
            .json(&serde_json::json!({ "audio_id": audio_id }));
        self.execute(builder).await
    }

    async fn get_contact(&self, contact_id: &ThreadId) -> Result<Contact> {
        self.fetch_contact(self.request(Method::GET, &["contacts", contact_id.as_str()])?)
            .await
    }

    async fn update_contact(
        &self,
        contact_id: &ThreadId,
        update: ContactUpdate,
    ) -> Result<Contact> {
        let builder = self
            .request(Method::PATCH, &["contacts", contact_id.as_str()])?
            .json(&update);
        self.fetch_contact(builder).await
    }

    async fn add_tag(&self, contact_id: &ThreadId, tag: &str) -> Result<()> {
        let builder = self
            .request(Method::POST, &["contacts", contact_id.as_str(), "tags"])?
            .json(&serde_json::json!({ "tag": tag }));
        self.execute(builder).await
    }

    async fn remove_tag(&self, contact_id: &ThreadId, tag: &str) -> Result<()> {
        let builder = self.request(
            Method::DELETE,
            &["contacts", contact_id.as_str(), "tags", tag],
        )?;
        self.execute(builder).await
    }

    async fn add_note(&self, contact_id: &ThreadId, content: &str) -> Result<Note> {
        let builder = self
            .request(Method::POST, &["contacts", contact_id.as_str(), "notes"])?
            .json(&serde_json::json!({ "content": content }));
        self.fetch_json(builder).await
    }

    async fn delete_note(&self, contact_id: &ThreadId, note_id: &str) -> Result<()> {
        let builder = self.request(
            Method::DELETE,
            &["contacts", contact_id.as_str(), "notes", note_id],
        )?;
        self.execute(builder).await
    }

    async fn create_reminder(
        &self,
        contact_id: &ThreadId,
        reminder: NewReminder,
    ) -> Result<Reminder> {
        let builder = self
            .request(Method::POST, &["contacts", contact_id.as_str(), "reminders"])?
            .json(&reminder);
        self.fetch_json(builder).await
    }

    async fn update_reminder(
        &self,
        contact_id: &ThreadId,
        reminder_id: &str,
        update: ReminderUpdate,
    ) -> Result<Reminder> {
        let builder = self
            .request(
                Method::PATCH,
                &["contacts", contact_id.as_str(), "reminders", reminder_id],
            )?
            .json(&update);
        self.fetch_json(builder).await
    }

    async fn usage_stats(&self) -> Result<UsageStats> {
        self.fetch_json(self.request(Method::GET, &["stats", "usage"])?).await
    }

    async fn profile(&self) -> Result<Profile> {
        self.fetch_json(self.request(Method::GET, &["profile"])?).await
    }

    async fn analytics_summary(&self) -> Result<AnalyticsSummary> {
        self.fetch_json(self.request(Method::GET, &["analytics", "summary"])?)
            .await
    }

    async fn sales_by_day(&self, days: u32) -> Result<Vec<SalesDay>> {
        let builder = self
            .request(Method::GET, &["analytics", "sales-by-day"])?
            .query(&[("days", days)]);
        let body = self.fetch_text(builder).await?;
        Ok(decode_list::<SalesDay, _, _>(&body, "sales_day", Ok)?)
    }

    async fn integration_status(&self) -> Result<Vec<IntegrationStatus>> {
        let body = self
            .fetch_text(self.request(Method::GET, &["integrations", "status"])?)
            .await?;
        Ok(decode_list::<IntegrationStatus, _, _>(&body, "integration", Ok)?)
    }

    async fn recent_integration_events(&self, limit: u32) -> Result<Vec<IntegrationEvent>> {
        let builder = self
            .request(Method::GET, &["integrations", "events"])?
            .query(&[("limit", limit)]);
        let body = self.fetch_text(builder).await?;
        Ok(decode_list::<IntegrationEvent, _, _>(&body, "integration_event", Ok)?)
    }
}

#[async_trait]
impl PushApi for HttpInboxClient {
    async fn message_stream(&self, thread_id: &ThreadId) -> Result<MessageStream> {
        let url = self.url(&["threads", thread_id.as_str(), "stream"])?;
        tracing::debug!(url = %url, "Opening message stream");

        // No request timeout: the stream stays open until the server ends it
        let mut builder = self
            .http_client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"));
        if let Some(token) = self.current_token() {
            builder = builder.bearer_auth(token);
        }

        let response = self.send(builder).await?;
        Ok(parse_sse_stream(
            response,
            MessageEventParser::new(thread_id.clone()),
        ))
    }
}

pub struct HttpInboxClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout: Duration,
}

impl HttpInboxClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpInboxClient> {
        let raw = self
            .base_url
            .ok_or_else(|| ApiError::Config("base_url is required".to_string()))?;
        let base_url = Url::parse(raw.trim())
            .map_err(|e| ApiError::Config(format!("Invalid base_url {:?}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("Invalid base_url {:?}", raw)));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .connect_timeout(self.timeout)
            .build()?;

        Ok(HttpInboxClient {
            http_client,
            base_url,
            token: RwLock::new(self.token.filter(|t| !t.trim().is_empty())),
            timeout: self.timeout,
        })
    }
}

impl Default for HttpInboxClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpInboxClient::new("https://inbox.example.com/api/");
        assert!(client.is_ok());
    }

    #[test]
    fn test_missing_base_url() {
        let result = HttpInboxClient::builder().build();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let client = HttpInboxClient::new("https://inbox.example.com/api/").unwrap();
        let url = client.url(&["contacts", "7", "tags", "pós venda"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://inbox.example.com/api/contacts/7/tags/p%C3%B3s%20venda"
        );
    }

    #[test]
    fn test_token_can_be_replaced() {
        let client = HttpInboxClient::builder()
            .base_url("http://localhost:8000")
            .token("abc")
            .build()
            .unwrap();
        assert!(client.has_token());

        client.set_token(None);
        assert!(!client.has_token());
    }
}
