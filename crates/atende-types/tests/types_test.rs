use atende_types::{
    FeedMode, LeadClassification, LeadLevel, LeadSource, Message, MessageId, Role, SyncConfig,
    Thread, ThreadId, WireMessage, WireThread,
};
use serde_json::json;
use std::time::Duration;

#[test]
fn test_sync_config_defaults() {
    let config = SyncConfig::default();

    assert_eq!(config.message_poll_interval, Duration::from_secs(2));
    assert_eq!(config.thread_poll_interval, Duration::from_secs(15));
    assert_eq!(config.reconcile_window_ms(), 5000);
    assert_eq!(config.feed, FeedMode::Poll);
}

#[test]
fn test_sync_config_builder() {
    let config = SyncConfig::new()
        .with_message_poll_interval(Duration::from_millis(500))
        .with_feed(FeedMode::Push);

    assert_eq!(config.message_poll_interval, Duration::from_millis(500));
    assert_eq!(config.feed, FeedMode::Push);
}

#[test]
fn test_classification_from_score() {
    let hot = LeadClassification::from_score(82, LeadSource::Backend);
    assert_eq!(hot.level, LeadLevel::Quente);
    assert_eq!(hot.score, 82);

    let clamped = LeadClassification::from_score(250, LeadSource::Heuristic);
    assert_eq!(clamped.score, 100);
}

#[test]
fn test_classification_from_level() {
    let warm = LeadClassification::from_level(LeadLevel::Morno, LeadSource::Stage);
    assert_eq!(warm.score, 55);
    assert_eq!(LeadLevel::from_score(warm.score), LeadLevel::Morno);
}

#[test]
fn test_thread_list_payload() {
    let payload = json!([
        { "id": 1, "last_message_at": "2024-01-01T10:00", "lead_score": 35.4 },
        { "id": 2, "last_message_at": "2024-01-02T09:00", "human_takeover": true }
    ]);

    let wires: Vec<WireThread> = serde_json::from_value(payload).unwrap();
    let threads: Vec<Thread> = wires
        .into_iter()
        .map(Thread::try_from)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(threads[0].lead_score, Some(35));
    assert!(threads[1].human_takeover);
    assert!(threads[1].last_activity() > threads[0].last_activity());
}

#[test]
fn test_message_serialization_roundtrip_keeps_temp_id() {
    let pending = Message::pending(ThreadId::from("t1"), Role::User, false, "oi");
    let json = serde_json::to_string(&pending).unwrap();
    let back: Message = serde_json::from_str(&json).unwrap();

    assert!(back.id.is_temp());
    assert_eq!(back, pending);
}

#[test]
fn test_wire_message_echoes_client_key() {
    let wire: WireMessage = serde_json::from_value(json!({
        "id": 7,
        "role": "user",
        "content": "quero comprar",
        "created_at": 1_704_103_200_000_i64,
        "client_key": "abc"
    }))
    .unwrap();

    let message = wire.into_message(&ThreadId::from(1)).unwrap();
    assert_eq!(message.id, MessageId::Server(7));
    assert_eq!(message.client_key.as_deref(), Some("abc"));
}
