use atende_types::{Message, ThreadId, WireMessage};

use crate::buffer_utils::SseLineParser;
use crate::error::Result;

/// Parses `data:` payloads of the thread stream into validated messages.
/// A payload is one message object or an array of them.
pub struct MessageEventParser {
    thread_id: ThreadId,
}

impl MessageEventParser {
    pub fn new(thread_id: ThreadId) -> Self {
        Self { thread_id }
    }
}

impl SseLineParser for MessageEventParser {
    type Item = Message;

    fn parse_data_line(&self, data: &str) -> Result<Vec<Message>> {
        let wires: Vec<WireMessage> = if data.trim_start().starts_with('[') {
            serde_json::from_str(data)?
        } else {
            vec![serde_json::from_str(data)?]
        };

        let messages = wires
            .into_iter()
            .map(|wire| wire.into_message(&self.thread_id))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(messages)
    }
}
