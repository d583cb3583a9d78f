use futures::{Stream, StreamExt};
use reqwest::Response;
use std::fmt::Display;
use std::pin::Pin;

use super::buffering::LineBuffer;
use crate::error::{ApiError, Result};

/// Strategy for turning SSE `data:` payloads into items
pub trait SseLineParser: Send {
    type Item: Send + 'static;

    fn parse_data_line(&self, data: &str) -> Result<Vec<Self::Item>>;

    /// Check if this line signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// SSE parsing over the body of an HTTP response
pub fn parse_sse_stream<P>(
    response: Response,
    parser: P,
) -> Pin<Box<dyn Stream<Item = Result<P::Item>> + Send>>
where
    P: SseLineParser + 'static,
{
    parse_sse_bytes(response.bytes_stream(), parser)
}

/// SSE parsing over any chunked byte stream
pub fn parse_sse_bytes<S, B, E, P>(
    stream: S,
    parser: P,
) -> Pin<Box<dyn Stream<Item = Result<P::Item>> + Send>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = LineBuffer::default();

        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    if let Err(e) = buffer.push(bytes.as_ref()) {
                        yield Err(e);
                        break;
                    }

                    while let Some(line_result) = buffer.next_line() {
                        let line = match line_result {
                            Ok(line) => line,
                            Err(e) => {
                                yield Err(e);
                                continue;
                            }
                        };

                        // Comments (`: keep-alive`) and `event:`/`id:` fields carry no payload
                        let Some(data) = line.strip_prefix("data:") else {
                            continue;
                        };
                        let data = data.trim();

                        if parser.is_done_marker(data) {
                            break 'outer;
                        }

                        match parser.parse_data_line(data) {
                            Ok(items) => {
                                for item in items {
                                    yield Ok(item);
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(ApiError::Stream(e.to_string()));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperParser;

    impl SseLineParser for UpperParser {
        type Item = String;

        fn parse_data_line(&self, data: &str) -> Result<Vec<String>> {
            Ok(vec![data.to_uppercase()])
        }
    }

    #[tokio::test]
    async fn test_parses_split_chunks_and_stops_at_done() {
        let chunks: Vec<std::result::Result<&'static [u8], String>> = vec![
            Ok(&b": keep-alive\n\nda"[..]),
            Ok(&b"ta: hello\n"[..]),
            Ok(&b"event: message\ndata:world\n\ndata: [DONE]\ndata: late\n"[..]),
        ];

        let items: Vec<String> = parse_sse_bytes(futures::stream::iter(chunks), UpperParser)
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(items, vec!["HELLO".to_string(), "WORLD".to_string()]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let chunks: Vec<std::result::Result<&'static [u8], String>> =
            vec![Ok(&b"data: a\n"[..]), Err("reset".to_string()), Ok(&b"data: b\n"[..])];

        let results: Vec<Result<String>> =
            parse_sse_bytes(futures::stream::iter(chunks), UpperParser).collect().await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ApiError::Stream(_))));
    }
}
