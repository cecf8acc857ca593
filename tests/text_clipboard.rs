mod common;

use cloud_clipboard::client::ClientError;
use common::TestServer;

#[tokio::test]
async fn test_hello_roundtrip_then_delete() {
    let server = TestServer::start().await;
    let mut texts = server.texts();

    let created = texts.add("hello").await.unwrap();
    assert_eq!(created.text, "hello");
    assert_eq!(created.size, 5);

    let items = texts.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].value, "hello");
    assert_eq!(items[0].key, created.id);

    texts.remove(&created.id).await.unwrap();
    assert!(texts.items().is_empty());
    assert!(texts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_most_recently_used_first() {
    let server = TestServer::start().await;
    let mut texts = server.texts();

    let first = texts.add("first").await.unwrap();
    let second = texts.add("second").await.unwrap();

    let keys: Vec<_> = texts.items().iter().map(|i| i.key.clone()).collect();
    assert_eq!(keys, vec![second.id.clone(), first.id.clone()]);

    // Reading an item moves it to the front.
    let item = texts.get(&first.id).await.unwrap();
    assert_eq!(item.value, "first");
    assert_eq!(texts.items()[0].key, first.id);
}

#[tokio::test]
async fn test_clear_empties_list() {
    let server = TestServer::start().await;
    let mut texts = server.texts();

    texts.add("a").await.unwrap();
    texts.add("b").await.unwrap();
    assert_eq!(texts.items().len(), 2);

    texts.clear().await.unwrap();
    assert!(texts.items().is_empty());
    assert!(texts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_unknown_key_is_404() {
    let server = TestServer::start().await;
    let mut texts = server.texts();

    let err = texts.remove("no-such-key").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {:?}", err);
    assert_eq!(err.to_string(), "Text not found");

    let err = texts.get("no-such-key").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_blank_text_is_rejected_locally() {
    let server = TestServer::start().await;
    let mut texts = server.texts();

    let err = texts.add("  \n ").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(texts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_text_is_rejected_by_server() {
    let server = TestServer::start_with(|config| config.clipboard.max_item_size = 16).await;
    let mut texts = server.texts();

    let err = texts.add(&"x".repeat(17)).await.unwrap_err();
    match err {
        ClientError::Server { status, code, message } => {
            assert_eq!(status, 400);
            assert_eq!(code, None);
            assert_eq!(message, "Text size exceeds maximum limit");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    texts.add(&"x".repeat(16)).await.unwrap();
}

#[tokio::test]
async fn test_cache_evicts_least_recently_used() {
    let server = TestServer::start_with(|config| config.clipboard.max_items = 2).await;
    let mut texts = server.texts();

    let a = texts.add("a").await.unwrap();
    let b = texts.add("b").await.unwrap();
    texts.get(&a.id).await.unwrap();
    let c = texts.add("c").await.unwrap();

    let keys: Vec<_> = texts.items().iter().map(|i| i.key.clone()).collect();
    assert_eq!(keys, vec![c.id, a.id]);
    assert!(texts.get(&b.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let health = server.transport.health().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let transport = cloud_clipboard::client::Transport::new(
        "http://127.0.0.1:9/api",
        std::time::Duration::from_millis(500),
    )
    .unwrap();
    let mut texts = cloud_clipboard::client::TextClipboard::new(std::sync::Arc::new(transport));

    assert!(matches!(texts.list().await, Err(ClientError::Network(_))));
    assert!(texts.items().is_empty());
}

#[tokio::test]
async fn test_text_body_is_capped_before_parsing() {
    let server = TestServer::start_with(|config| config.clipboard.max_item_size = 16).await;
    let url = server.transport.url(&["clipboard", "text"]);

    // Unterminated JSON: only the body limit can classify this as too large.
    let body = format!("{{\"text\": \"{}", "a".repeat(8 * 1024));
    let response = reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let error: cloud_clipboard::common::messages::ErrorBody = response.json().await.unwrap();
    assert_eq!(error.text(), Some("Text size exceeds maximum limit"));
}

#[tokio::test]
async fn test_malformed_small_body_is_invalid_text() {
    let server = TestServer::start().await;
    let url = server.transport.url(&["clipboard", "text"]);

    let response = reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body("{\"text\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let error: cloud_clipboard::common::messages::ErrorBody = response.json().await.unwrap();
    assert_eq!(error.text(), Some("Invalid text data"));
}
