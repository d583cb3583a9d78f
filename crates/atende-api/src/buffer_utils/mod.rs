mod buffering;
mod sse_parser;

pub use buffering::{LineBuffer, MAX_LINE_BYTES};
pub use sse_parser::{parse_sse_bytes, parse_sse_stream, SseLineParser};
