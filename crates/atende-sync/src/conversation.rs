use serde::{Deserialize, Serialize};

use atende_types::{Message, MessageId, Role, ThreadId};

use crate::merge::{assistant_caught_up, merge_messages};

/// Dismissible error shown above the composer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub message: String,
    /// Offer to put the failed text back in the composer
    pub retry: bool,
}

impl Banner {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retry: false,
        }
    }

    pub fn with_retry(mut self) -> Self {
        self.retry = true;
        self
    }
}

/// What a merge changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub changed: bool,
    pub typing_cleared: bool,
}

/// State of the active conversation view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub thread_id: Option<ThreadId>,
    /// Bumped on every selection; work started under an older value is stale
    pub generation: u64,
    pub messages: Vec<Message>,
    pub input: String,
    pub typing: bool,
    pub takeover: bool,
    pub banner: Option<Banner>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to another thread, dropping every bit of transient state
    pub fn reset(&mut self, thread_id: ThreadId, generation: u64, takeover: bool) {
        *self = Self {
            thread_id: Some(thread_id),
            generation,
            takeover,
            ..Self::default()
        };
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Merge a server batch. `None` when the batch belongs to an older selection.
    pub fn apply_batch(
        &mut self,
        generation: u64,
        batch: &[Message],
        window_ms: i64,
    ) -> Option<MergeOutcome> {
        if !self.is_current(generation) {
            return None;
        }

        let merged = merge_messages(&self.messages, batch, window_ms);
        let changed = merged != self.messages;
        self.messages = merged;

        let typing_cleared = self.typing && assistant_caught_up(&self.messages);
        if typing_cleared {
            self.typing = false;
        }

        Some(MergeOutcome {
            changed,
            typing_cleared,
        })
    }

    /// Move the composer text into a temporary message
    ///
    /// Operator replies during takeover are assistant-side and human
    /// authored; otherwise the text goes out as the end user and the
    /// assistant is expected to answer.
    pub fn begin_send(&mut self) -> Option<Message> {
        let thread_id = self.thread_id.clone()?;
        let content = self.input.trim();
        if content.is_empty() {
            return None;
        }

        let message = if self.takeover {
            Message::pending(thread_id, Role::Assistant, true, content)
        } else {
            Message::pending(thread_id, Role::User, false, content)
        };

        self.messages.push(message.clone());
        self.input.clear();
        self.banner = None;
        if !self.takeover {
            self.typing = true;
        }
        Some(message)
    }

    /// Undo a failed send: drop the temporary, restore the text, raise the banner
    pub fn rollback(&mut self, pending: &Message, banner_message: String) {
        self.remove(&pending.id);
        self.input = pending.content.clone();
        self.typing = false;
        self.banner = Some(Banner::error(banner_message).with_retry());
    }

    fn remove(&mut self, id: &MessageId) {
        self.messages.retain(|m| &m.id != id);
    }

    /// Put the last text the local side wrote back into the composer
    pub fn retry(&mut self) -> bool {
        self.banner = None;
        let last = self
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User || m.is_human)
            .map(|m| m.content.clone());

        match last {
            Some(content) if self.input.trim().is_empty() => {
                self.input = content;
                true
            }
            _ => !self.input.trim().is_empty(),
        }
    }

    /// Returns the previous value
    pub fn set_takeover(&mut self, active: bool) -> bool {
        let previous = self.takeover;
        self.takeover = active;
        if active {
            self.typing = false;
        }
        previous
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }
}
