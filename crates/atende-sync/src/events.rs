use serde::Serialize;

use atende_crm::ThreadRow;
use atende_types::{Message, ThreadId};

use crate::conversation::Banner;

/// Published by the sync tasks for whoever renders the inbox
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A thread became active; earlier events for other threads are obsolete
    Selected {
        thread_id: ThreadId,
        generation: u64,
    },

    /// Full, ordered message list of the active thread
    Messages {
        thread_id: ThreadId,
        messages: Vec<Message>,
    },

    Typing {
        thread_id: ThreadId,
        active: bool,
    },

    Takeover {
        thread_id: ThreadId,
        active: bool,
    },

    /// `None` clears the banner
    Banner {
        #[serde(skip_serializing_if = "Option::is_none")]
        thread_id: Option<ThreadId>,
        banner: Option<Banner>,
    },

    /// Refreshed sidebar list, newest activity first
    Threads { rows: Vec<ThreadRow> },
}
