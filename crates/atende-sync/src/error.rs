use atende_api::{ApiError, GENERIC_ERROR_MESSAGE};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("No thread selected")]
    NoActiveThread,

    #[error("Message is empty")]
    EmptyMessage,
}

impl SyncError {
    /// Text for the error banner
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Api(e) => e.user_message(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
