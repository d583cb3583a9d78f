use atende_types::SchemaError;
use thiserror::Error;

/// Banner text when the server gives no usable detail
pub const GENERIC_ERROR_MESSAGE: &str = "Não foi possível concluir a operação. Tente novamente.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Status {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    #[error("Invalid payload: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Build a status error, pulling `detail`/`error`/`message` out of a JSON body
    pub fn from_status(status: u16, body: String) -> Self {
        let detail = extract_detail(&body);
        ApiError::Status {
            status,
            detail,
            body,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Text for the dismissible error banner
    pub fn user_message(&self) -> String {
        self.detail()
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    for key in ["detail", "error", "message"] {
        match value.get(key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                return Some(s.clone());
            }
            // Validation errors arrive as [{ "msg": "..." }, ...]
            Some(serde_json::Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !msgs.is_empty() {
                    return Some(msgs.join("; "));
                }
            }
            _ => {}
        }
    }

    None
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_from_string_field() {
        let err = ApiError::from_status(400, r#"{"detail": "Thread not found"}"#.to_string());
        assert_eq!(err.detail(), Some("Thread not found"));
        assert_eq!(err.user_message(), "Thread not found");
    }

    #[test]
    fn test_detail_from_validation_list() {
        let err = ApiError::from_status(
            422,
            r#"{"detail": [{"msg": "field required"}, {"msg": "too long"}]}"#.to_string(),
        );
        assert_eq!(err.detail(), Some("field required; too long"));
    }

    #[test]
    fn test_generic_fallback() {
        let err = ApiError::from_status(502, "<html>Bad gateway</html>".to_string());
        assert_eq!(err.detail(), None);
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::from_status(401, String::new());
        assert!(err.is_unauthorized());
        assert!(!err.is_not_found());
    }
}
