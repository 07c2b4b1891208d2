#![cfg(not(target_arch = "wasm32"))]

use webhook_chat::{
    client_info::ClientInfo,
    db::{DatabaseError, WebhookDb},
    storage::{FileStore, LocalPersistence},
    types::ChatMessage,
};

fn message(text: &str) -> ChatMessage {
    ChatMessage::new(text, &ClientInfo::from_user_agent("Mozilla/5.0 (X11; Linux x86_64) Firefox/125.0"))
}

#[test]
fn test_local_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let local = LocalPersistence::new(FileStore::new(dir.path()));
        assert_eq!(local.load_webhook_url(), "");
        local.save_webhook_url("https://hook.example/a");
        local.save_messages(&[message("m1"), message("m2")]);
        local.save_categories(&["a".to_string(), "b".to_string()]);
    }

    let local = LocalPersistence::new(FileStore::new(dir.path()));
    assert_eq!(local.load_webhook_url(), "https://hook.example/a");
    let texts: Vec<_> = local.load_messages().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["m1", "m2"]);
    assert_eq!(local.load_categories(), vec!["a", "b"]);
}

#[test]
fn test_history_is_stored_as_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalPersistence::new(FileStore::new(dir.path()));
    local.save_messages(&[message("hi")]);

    let raw = std::fs::read_to_string(dir.path().join("chatMessages")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["text"], "hi");
    assert_eq!(entries[0]["os"], "Linux");
    assert_eq!(entries[0]["browser"], "Firefox");
}

#[test]
fn test_append_keeps_entries_with_null_fields() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("chatMessages"),
        r#"[{"text":"old1","timestamp":"2024-01-01T00:00:00.000Z","os":"Linux","browser":"Firefox"},{"text":"old2","timestamp":"2024-01-02T00:00:00.000Z","os":"Linux","browser":null}]"#,
    )
    .unwrap();

    let local = LocalPersistence::new(FileStore::new(dir.path()));
    assert!(local.append_message(message("new")).is_stored());

    let reopened = LocalPersistence::new(FileStore::new(dir.path()));
    let texts: Vec<_> = reopened.load_messages().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["old1", "old2", "new"]);
}

#[tokio::test]
async fn test_structured_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let db = WebhookDb::new(dir.path());
    assert_eq!(db.load().await.unwrap(), None);
    assert!(db.path().exists());
}

#[tokio::test]
async fn test_structured_store_overwrites_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let db = WebhookDb::new(dir.path());
    db.save("https://hook.example/first").await.unwrap();
    db.save("https://hook.example/second").await.unwrap();
    assert_eq!(db.load().await.unwrap().as_deref(), Some("https://hook.example/second"));

    let reopened = WebhookDb::new(dir.path());
    assert_eq!(
        reopened.load().await.unwrap().as_deref(),
        Some("https://hook.example/second")
    );
}

#[tokio::test]
async fn test_stores_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalPersistence::new(FileStore::new(dir.path()));
    let db = WebhookDb::new(dir.path());

    local.save_webhook_url("https://local.example");
    assert_eq!(db.load().await.unwrap(), None);

    db.save("https://db.example").await.unwrap();
    assert_eq!(local.load_webhook_url(), "https://local.example");
}

#[tokio::test]
async fn test_unopenable_database_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file in the way").unwrap();

    let db = WebhookDb::new(&blocker);
    let err = db.load().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Connection(_)));
    assert_eq!(err.to_string(), "Database connection error.");
    assert!(matches!(db.save("https://x.example").await, Err(DatabaseError::Connection(_))));
}
