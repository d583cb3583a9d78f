use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::MissedTickBehavior;

use atende_api::{InboxApi, PushApi};
use atende_types::{Message, ThreadId};

pub type MessageBatches = Pin<Box<dyn Stream<Item = Vec<Message>> + Send>>;

/// Source of server messages for the active thread
///
/// Each item is a set of server messages to merge; a poll yields the full
/// list, a push yields whatever arrived. Failures are the feed's business
/// and never reach the consumer.
pub trait MessageFeed: Send + Sync {
    fn batches(&self, thread_id: ThreadId) -> MessageBatches;
}

/// Refetches the whole list on a fixed interval
pub struct PollingFeed {
    api: Arc<dyn InboxApi>,
    interval: Duration,
}

impl PollingFeed {
    pub fn new(api: Arc<dyn InboxApi>, interval: Duration) -> Self {
        Self { api, interval }
    }
}

impl MessageFeed for PollingFeed {
    fn batches(&self, thread_id: ThreadId) -> MessageBatches {
        let api = Arc::clone(&self.api);
        let period = self.interval;

        Box::pin(async_stream::stream! {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; selection already loaded the list
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match api.get_messages(&thread_id).await {
                    Ok(messages) => yield messages,
                    Err(e) => {
                        tracing::debug!(thread_id = %thread_id, error = %e, "Message poll failed");
                    }
                }
            }
        })
    }
}

/// Server-sent events, reopened after `reconnect_interval` when the stream drops
///
/// Every reconnect starts with a full fetch so nothing sent while
/// disconnected is missed.
pub struct PushFeed {
    push: Arc<dyn PushApi>,
    api: Arc<dyn InboxApi>,
    reconnect_interval: Duration,
}

impl PushFeed {
    pub fn new(push: Arc<dyn PushApi>, api: Arc<dyn InboxApi>, reconnect_interval: Duration) -> Self {
        Self {
            push,
            api,
            reconnect_interval,
        }
    }
}

impl MessageFeed for PushFeed {
    fn batches(&self, thread_id: ThreadId) -> MessageBatches {
        let push = Arc::clone(&self.push);
        let api = Arc::clone(&self.api);
        let reconnect = self.reconnect_interval;

        Box::pin(async_stream::stream! {
            let mut first = true;
            loop {
                if !first {
                    tokio::time::sleep(reconnect).await;
                    match api.get_messages(&thread_id).await {
                        Ok(messages) => yield messages,
                        Err(e) => {
                            tracing::debug!(thread_id = %thread_id, error = %e, "Catch-up fetch failed");
                        }
                    }
                }
                first = false;

                let mut stream = match push.message_stream(&thread_id).await {
                    Ok(stream) => stream,
                    Err(e) => {
                        tracing::debug!(thread_id = %thread_id, error = %e, "Could not open message stream");
                        continue;
                    }
                };

                while let Some(item) = stream.next().await {
                    match item {
                        Ok(message) => yield vec![message],
                        Err(e) => {
                            tracing::debug!(thread_id = %thread_id, error = %e, "Message stream failed");
                            break;
                        }
                    }
                }
                tracing::debug!(thread_id = %thread_id, "Message stream closed");
            }
        })
    }
}
