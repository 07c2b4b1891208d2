#![cfg(target_arch = "wasm32")]

use std::time::Duration;

use wasm_bindgen_test::*;
use webhook_chat::{
    api::{WebhookClient, WebhookError},
    config::Config,
    db::WebhookDb,
    storage::{BrowserStorage, FallbackStore, KeyValueStore, LocalPersistence, MemoryStore, CHAT_MESSAGES_KEY},
    types::ChatMessage,
};

wasm_bindgen_test_configure!(run_in_browser);

fn message() -> ChatMessage {
    ChatMessage {
        text: "hello webhook".to_string(),
        timestamp: "2024-05-01T12:00:00.000Z".to_string(),
        ..ChatMessage::default()
    }
}

#[wasm_bindgen_test]
fn test_local_storage_round_trip() {
    let local = LocalPersistence::new(BrowserStorage::local().unwrap());
    assert!(local.save_webhook_url("https://hook.example/browser").is_stored());
    assert_eq!(local.load_webhook_url(), "https://hook.example/browser");

    local.save_messages(&[message()]);
    let texts: Vec<_> = local.load_messages().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["hello webhook"]);
}

#[wasm_bindgen_test]
fn test_local_storage_keeps_entries_with_null_fields() {
    let storage = BrowserStorage::local().unwrap();
    storage
        .set_item(CHAT_MESSAGES_KEY, r#"[{"text":"old","browser":null}]"#)
        .unwrap();

    let local = LocalPersistence::new(storage);
    assert!(local.append_message(message()).is_stored());
    let texts: Vec<_> = local.load_messages().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["old", "hello webhook"]);
}

#[wasm_bindgen_test]
fn test_open_local_storage_is_persistent() {
    let memory = MemoryStore::new();
    let store = FallbackStore::new(BrowserStorage::local().ok(), &memory);
    assert!(store.is_persistent());
}

#[wasm_bindgen_test]
async fn test_indexed_db_overwrites_record() {
    let db = WebhookDb::new();
    db.save("https://hook.example/first").await.unwrap();
    db.save("https://hook.example/second").await.unwrap();
    assert_eq!(
        WebhookDb::new().load().await.unwrap().as_deref(),
        Some("https://hook.example/second")
    );
}

#[wasm_bindgen_test]
async fn test_fetch_with_empty_url_is_configuration_error() {
    let client = WebhookClient::new(&Config::default());
    assert_eq!(client.send("", &message()).await.unwrap_err(), WebhookError::Configuration);
}

#[wasm_bindgen_test]
async fn test_fetch_to_closed_port_is_connectivity_error() {
    let client = WebhookClient::new(&Config::default().with_timeout(Duration::from_secs(5)));
    let err = client.send("http://127.0.0.1:9/hook", &message()).await.unwrap_err();
    assert_eq!(err, WebhookError::Connectivity);
}
