pub mod conversation;
pub mod error;
pub mod events;
pub mod feed;
pub mod merge;
pub mod thread_list;
pub mod thread_sync;

pub use conversation::{Banner, Conversation, MergeOutcome};
pub use error::{Result, SyncError};
pub use events::SyncEvent;
pub use feed::{MessageBatches, MessageFeed, PollingFeed, PushFeed};
pub use merge::{assistant_caught_up, merge_messages, reconciles};
pub use thread_list::ThreadListSync;
pub use thread_sync::ThreadSync;
