pub mod analytics;
pub mod config;
pub mod contact;
pub mod error;
pub mod ids;
pub mod lead;
pub mod message;
pub mod route;
pub mod thread;
pub mod wire;

pub use analytics::{
    AnalyticsSummary, IntegrationEvent, IntegrationStatus, Profile, SalesDay, UsageStats,
};
pub use config::{FeedMode, SyncConfig};
pub use contact::{Contact, ContactUpdate, NewReminder, Note, Reminder, ReminderUpdate};
pub use error::SchemaError;
pub use ids::{ThreadId, WireId};
pub use lead::{LeadClassification, LeadLevel, LeadSource};
pub use message::{Message, MessageId, OutgoingMessage, Role};
pub use route::Route;
pub use thread::{NewThread, Thread, ThreadUpdate};
pub use wire::{WireContact, WireMessage, WireThread, WireTimestamp, SUPPORTED_SCHEMA_VERSION};
