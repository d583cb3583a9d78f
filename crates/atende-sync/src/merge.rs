use std::collections::{BTreeMap, HashSet};

use atende_types::{Message, MessageId, Role};

/// Whether `server` is the persisted copy of the temporary message `temp`
///
/// With an idempotency key on both sides the keys decide. Otherwise the
/// role and trimmed content must agree and the timestamps must be within
/// `window_ms` of each other.
pub fn reconciles(temp: &Message, server: &Message, window_ms: i64) -> bool {
    if let (Some(a), Some(b)) = (&temp.client_key, &server.client_key) {
        return a == b;
    }

    temp.role == server.role
        && temp.content.trim() == server.content.trim()
        && (server.created_at - temp.created_at).num_milliseconds().abs() <= window_ms
}

/// Merge a full server message list into the local one
///
/// Temporary messages reconciled by the server copy are dropped, every
/// server message overwrites the local entry with the same id, and the
/// result is ordered by id: temporaries first, then server ids ascending.
/// Each server message reconciles at most one temporary, and only server
/// ids the local list has not seen yet may do so.
pub fn merge_messages(local: &[Message], server: &[Message], window_ms: i64) -> Vec<Message> {
    let known: HashSet<i64> = local.iter().filter_map(Message::server_id).collect();
    let mut claimed: HashSet<i64> = HashSet::new();
    let mut merged: BTreeMap<MessageId, Message> = BTreeMap::new();

    for message in local {
        if message.is_temporary() {
            let claim = server.iter().find_map(|candidate| {
                let id = candidate.server_id()?;
                let free = !known.contains(&id) && !claimed.contains(&id);
                (free && reconciles(message, candidate, window_ms)).then_some(id)
            });

            if let Some(id) = claim {
                claimed.insert(id);
                continue;
            }
        }
        merged.insert(message.id.clone(), message.clone());
    }

    for message in server {
        merged.insert(message.id.clone(), message.clone());
    }

    merged.into_values().collect()
}

/// True when the newest message is an assistant reply written after the
/// last user message, which ends the "assistant typing" indicator
pub fn assistant_caught_up(messages: &[Message]) -> bool {
    let Some(last) = messages.iter().filter(|m| !m.is_temporary()).last() else {
        return false;
    };
    if last.role != Role::Assistant {
        return false;
    }

    messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.created_at)
        .max()
        .map_or(true, |last_user| last.created_at > last_user)
}
