//! High-level builder API for an inbox session

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use atende_api::{HttpInboxClient, InboxApi};
use atende_crm::{IntegrationHealth, LeadClassifier, LeadDistribution, SalesOverview};
use atende_store::{KeyValueStore, LeadOverrides, MemoryStore, Session};
use atende_sync::{MessageFeed, PollingFeed, PushFeed, SyncEvent, ThreadListSync, ThreadSync};
use atende_types::{FeedMode, SyncConfig};

/// Builder for a configured [`Inbox`]
///
/// # Example
///
/// ```rust,no_run
/// use atende::prelude::*;
///
/// # fn main() -> Result<()> {
/// let inbox = InboxBuilder::new()
///     .base_url("https://api.example.com")
///     .timeout(std::time::Duration::from_secs(10))
///     .sync_config(SyncConfig::new().with_feed(FeedMode::Push))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct InboxBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
    store: Option<Arc<dyn KeyValueStore>>,
    sync_config: SyncConfig,
}

impl Default for InboxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InboxBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout: None,
            store: None,
            sync_config: SyncConfig::default(),
        }
    }

    /// Backend root URL (required)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Bearer token; without one the token saved in the store is used
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Store for session and overrides (default: in-memory)
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn sync_config(mut self, config: SyncConfig) -> Self {
        self.sync_config = config;
        self
    }

    /// Build the inbox
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or invalid, or if the
    /// saved session cannot be read.
    pub fn build(self) -> Result<Inbox> {
        let base_url = self
            .base_url
            .context("Base URL is required. Call .base_url(url)")?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let session = Session::new(Arc::clone(&store));
        let overrides = LeadOverrides::new(Arc::clone(&store));

        let token = match self.token {
            Some(token) => Some(token),
            None => session.token().context("Failed to read saved session")?,
        };

        let mut client = HttpInboxClient::builder().base_url(&base_url);
        if let Some(token) = token {
            client = client.token(token);
        }
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let client = client
            .build()
            .with_context(|| format!("Failed to create inbox client for {}", base_url))?;

        tracing::info!(base_url = %base_url, authenticated = client.has_token(), "Inbox ready");

        Ok(Inbox {
            client: Arc::new(client),
            classifier: LeadClassifier::new().with_overrides(overrides.clone()),
            overrides,
            session,
            config: self.sync_config,
        })
    }
}

/// Client, store and sync configuration for one backend
pub struct Inbox {
    client: Arc<HttpInboxClient>,
    classifier: LeadClassifier,
    overrides: LeadOverrides,
    session: Session,
    config: SyncConfig,
}

impl Inbox {
    pub fn api(&self) -> Arc<dyn InboxApi> {
        self.client.clone()
    }

    pub fn client(&self) -> &HttpInboxClient {
        &self.client
    }

    pub fn classifier(&self) -> &LeadClassifier {
        &self.classifier
    }

    pub fn overrides(&self) -> &LeadOverrides {
        &self.overrides
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Save the token and use it from now on
    pub fn login(&self, token: &str) -> Result<()> {
        self.session.set_token(token).context("Failed to save session")?;
        self.client.set_token(Some(token.trim().to_string()));
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.session.clear_token().context("Failed to clear session")?;
        self.client.set_token(None);
        Ok(())
    }

    fn feed(&self) -> Arc<dyn MessageFeed> {
        match self.config.feed {
            FeedMode::Poll => Arc::new(PollingFeed::new(
                self.client.clone(),
                self.config.message_poll_interval,
            )),
            FeedMode::Push => Arc::new(PushFeed::new(
                self.client.clone(),
                self.client.clone(),
                self.config.message_poll_interval,
            )),
        }
    }

    /// Active-thread sync using the configured feed
    pub fn thread_sync(&self) -> (ThreadSync, mpsc::Receiver<SyncEvent>) {
        ThreadSync::new(self.api(), self.feed(), self.config.clone())
    }

    /// Sidebar poller publishing on `events`, not yet started
    pub fn thread_list(&self, events: mpsc::Sender<SyncEvent>) -> ThreadListSync {
        ThreadListSync::new(
            self.api(),
            self.classifier.clone(),
            self.config.thread_poll_interval,
            events,
        )
    }

    pub async fn lead_distribution(&self) -> Result<LeadDistribution> {
        let threads = self
            .client
            .list_threads()
            .await
            .context("Failed to list threads")?;
        let rows = self.classifier.classify_threads(threads);
        Ok(LeadDistribution::from_classifications(
            rows.iter().map(|row| &row.lead),
        ))
    }

    pub async fn sales_overview(&self, days: u32) -> Result<SalesOverview> {
        let days = self
            .client
            .sales_by_day(days)
            .await
            .context("Failed to load sales")?;
        Ok(SalesOverview::from_days(&days))
    }

    pub async fn integration_health(&self, event_limit: u32) -> Result<IntegrationHealth> {
        let statuses = self
            .client
            .integration_status()
            .await
            .context("Failed to load integration status")?;
        let events = self
            .client
            .recent_integration_events(event_limit)
            .await
            .context("Failed to load integration events")?;
        Ok(IntegrationHealth::new(&statuses, &events))
    }
}
