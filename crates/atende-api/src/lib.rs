pub mod buffer_utils;
pub mod client;
pub mod error;
pub mod payload;
pub mod push;
pub mod traits;

pub use client::{HttpInboxClient, HttpInboxClientBuilder};
pub use error::{ApiError, Result, GENERIC_ERROR_MESSAGE};
pub use push::MessageEventParser;
pub use traits::{InboxApi, MessageStream, PushApi};
