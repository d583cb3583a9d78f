use std::collections::VecDeque;

use crate::error::{ApiError, Result};

/// Default ceiling for a single pending event line
pub const MAX_LINE_BYTES: usize = 256 * 1024;

/// Splits a chunked SSE body into lines
///
/// Bytes are kept until a `\n` arrives. A peer that never terminates a
/// line cannot grow the buffer past `max_line`; [`LineBuffer::push`]
/// fails instead and the stream is abandoned.
pub struct LineBuffer {
    pending: VecDeque<u8>,
    max_line: usize,
}

impl LineBuffer {
    pub fn new(max_line: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(max_line.min(4096)),
            max_line,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        self.pending.extend(chunk);

        let unterminated = match self.pending.iter().rposition(|&b| b == b'\n') {
            Some(last_newline) => self.pending.len() - last_newline - 1,
            None => self.pending.len(),
        };
        if unterminated > self.max_line {
            self.pending.clear();
            return Err(ApiError::Stream(format!(
                "event line exceeds {} bytes",
                self.max_line
            )));
        }
        Ok(())
    }

    /// Next complete line without its `\r\n`; `None` until one is available
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let mut raw: Vec<u8> = self.pending.drain(..=end).collect();
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        Some(
            String::from_utf8(raw)
                .map_err(|e| ApiError::Stream(format!("event line is not UTF-8: {}", e))),
        )
    }

    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(MAX_LINE_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_keep_leading_spaces() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"data: a\r\n: ping\n\n").unwrap();

        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: a");
        assert_eq!(buffer.next_line().unwrap().unwrap(), ": ping");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "");
        assert!(buffer.next_line().is_none());
    }

    #[test]
    fn test_partial_line_waits_for_newline() {
        let mut buffer = LineBuffer::default();

        buffer.push(b"data: {\"id\"").unwrap();
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.pending_bytes(), 11);

        buffer.push(b": 1}\n").unwrap();
        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: {\"id\": 1}");
        assert_eq!(buffer.pending_bytes(), 0);
    }

    #[test]
    fn test_oversized_line_is_rejected() {
        let mut buffer = LineBuffer::new(8);
        buffer.push(b"data: 1\n").unwrap();
        assert!(matches!(
            buffer.push(b"data: 123456"),
            Err(ApiError::Stream(_))
        ));
        assert_eq!(buffer.pending_bytes(), 0);
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let mut buffer = LineBuffer::new(8);
        buffer.push(&[0xff, 0xfe, b'\n']).unwrap();
        assert!(buffer.next_line().unwrap().is_err());
    }
}
