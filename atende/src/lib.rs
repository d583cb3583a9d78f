//! # Atende - headless inbox and CRM client
//!
//! Atende keeps a WhatsApp-style support inbox in sync with its backend:
//! - **Thread sync**: 2 s message polling (or server push) merged into the active conversation
//! - **Optimistic sends**: temporary messages reconciled by idempotency key or content/time match
//! - **Lead classification**: manual override, backend score, funnel stage, then a local heuristic
//! - **List views**: search, AND-combined filters and a single-key stable sort
//! - **Dashboards**: lead distribution, sales overview and integration health
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use atende::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let inbox = InboxBuilder::new()
//!         .base_url("https://api.example.com")
//!         .token("secret")
//!         .build()?;
//!
//!     let (sync, mut events) = inbox.thread_sync();
//!     sync.select(ThreadId::from(42), false).await?;
//!     sync.send_text("Olá! Como posso ajudar?").await?;
//!
//!     while let Some(event) = events.recv().await {
//!         if let SyncEvent::Messages { messages, .. } = event {
//!             println!("{} messages", messages.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **atende-types**: domain model and validated wire schemas
//! - **atende-api**: `InboxApi` trait and its HTTP client (REST + SSE)
//! - **atende-store**: key-value store for the session token and lead overrides
//! - **atende-crm**: classification, filters, sorting, dashboard aggregates
//! - **atende-sync**: feeds, merge, optimistic sends, background poll tasks

pub use atende_api as api;
pub use atende_crm as crm;
pub use atende_store as store;
pub use atende_sync as sync;
pub use atende_types as types;

pub use atende_api::{HttpInboxClient, InboxApi, PushApi};
pub use atende_crm::{LeadClassifier, ThreadFilter, ThreadRow};
pub use atende_store::{JsonFileStore, KeyValueStore, LeadOverrides, MemoryStore, Session};
pub use atende_sync::{SyncEvent, ThreadListSync, ThreadSync};
pub use atende_types::{LeadLevel, Message, SyncConfig, Thread, ThreadId};

/// High-level builder wiring client, store and sync together
pub mod builder;

pub mod prelude {
    pub use crate::builder::{Inbox, InboxBuilder};
    pub use crate::crm::{SortDirection, SortState, ThreadFilter, ThreadSortKey};
    pub use crate::sync::{Banner, SyncEvent};
    pub use crate::types::{FeedMode, LeadLevel, Message, Role, SyncConfig, Thread, ThreadId};
    pub use anyhow::Result;
}
