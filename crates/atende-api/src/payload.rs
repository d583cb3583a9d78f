use serde::de::DeserializeOwned;
use serde::Deserialize;

use atende_types::SchemaError;

/// List responses come either bare or wrapped in an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "threads",
            alias = "messages",
            alias = "items",
            alias = "data",
            alias = "events",
            alias = "days",
            alias = "integrations"
        )]
        results: Vec<T>,
    },
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items) => items,
            ListPayload::Wrapped { results } => results,
        }
    }
}

/// Decode a list and validate each entry, dropping the ones that fail
///
/// Only the envelope has to match. Entries are deserialized one by one so
/// a single malformed entry costs that entry, not the whole list.
pub fn decode_list<W, T, F>(body: &str, what: &'static str, mut convert: F) -> serde_json::Result<Vec<T>>
where
    W: DeserializeOwned,
    F: FnMut(W) -> Result<T, SchemaError>,
{
    let payload: ListPayload<serde_json::Value> = serde_json::from_str(body)?;
    let entries = payload.into_vec();
    let total = entries.len();

    let valid: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| {
            let wire = match serde_json::from_value::<W>(entry) {
                Ok(wire) => wire,
                Err(e) => {
                    tracing::warn!(kind = what, error = %e, "Dropping malformed entry from list payload");
                    return None;
                }
            };
            match convert(wire) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(kind = what, error = %e, "Dropping invalid entry from list payload");
                    None
                }
            }
        })
        .collect();

    if valid.len() < total {
        tracing::debug!(kind = what, total, kept = valid.len(), "List payload partially valid");
    }

    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atende_types::{Thread, WireThread};

    #[test]
    fn test_bare_and_wrapped_lists() {
        let bare: ListPayload<u32> = serde_json::from_str("[1, 2]").unwrap();
        let wrapped: ListPayload<u32> = serde_json::from_str(r#"{"threads": [3]}"#).unwrap();

        assert_eq!(bare.into_vec(), vec![1, 2]);
        assert_eq!(wrapped.into_vec(), vec![3]);
    }

    #[test]
    fn test_out_of_range_score_keeps_the_thread() {
        let body = r#"[{"id": 1}, {"id": 2, "lead_score": 120}, {"id": 3}]"#;
        let threads = decode_list::<WireThread, Thread, _>(body, "thread", Thread::try_from).unwrap();

        let ids: Vec<&str> = threads.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(threads[1].lead_score, None);
    }

    #[test]
    fn test_mistyped_entry_is_dropped_not_the_list() {
        let body = r#"{"threads": [{"id": 1}, {"id": 2, "lead_score": "72"}, {"id": 3}]}"#;
        let threads = decode_list::<WireThread, Thread, _>(body, "thread", Thread::try_from).unwrap();

        let ids: Vec<&str> = threads.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_failed_conversion_is_dropped() {
        let body = r#"[{"id": 1, "schema_version": 99}, {"id": 2}]"#;
        let threads = decode_list::<WireThread, Thread, _>(body, "thread", Thread::try_from).unwrap();

        let ids: Vec<&str> = threads.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_envelope_mismatch_fails() {
        let result = decode_list::<WireThread, Thread, _>(r#""nope""#, "thread", Thread::try_from);
        assert!(result.is_err());
    }
}
