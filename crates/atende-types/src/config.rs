use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How new messages reach the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    #[default]
    Poll,
    Push,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Active thread refresh
    pub message_poll_interval: Duration,
    /// Sidebar list refresh
    pub thread_poll_interval: Duration,
    /// Max distance between a temporary message and the server copy it matches
    pub reconcile_window: Duration,
    pub feed: FeedMode,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            message_poll_interval: Duration::from_secs(2),
            thread_poll_interval: Duration::from_secs(15),
            reconcile_window: Duration::from_millis(5000),
            feed: FeedMode::Poll,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message_poll_interval(mut self, interval: Duration) -> Self {
        self.message_poll_interval = interval;
        self
    }

    pub fn with_thread_poll_interval(mut self, interval: Duration) -> Self {
        self.thread_poll_interval = interval;
        self
    }

    pub fn with_reconcile_window(mut self, window: Duration) -> Self {
        self.reconcile_window = window;
        self
    }

    pub fn with_feed(mut self, feed: FeedMode) -> Self {
        self.feed = feed;
        self
    }

    pub fn reconcile_window_ms(&self) -> i64 {
        self.reconcile_window.as_millis() as i64
    }
}
