//! Webhook delivery tests driving the axum router with `tower::ServiceExt::oneshot`.

use axum::body::{Body, Bytes};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::{Request, StatusCode};
use kick_sdk::webhook::{
    ChatMessageEvent, MemoryEventsTracker, WebhookEventHeader, WebhookHandler,
};
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};
use std::time::Duration;
use tokio::sync::mpsc;
use tower::ServiceExt;

const RSA_PRIVATE_PEM: &str = include_str!("fixtures/rsa_private.pem");
const RSA_PUBLIC_PEM: &str = include_str!("fixtures/rsa_public.pem");

const CHAT_BODY: &str = r#"{
    "message_id": "msg-1",
    "broadcaster": {"is_anonymous": false, "user_id": 123, "username": "streamer",
                    "is_verified": true, "profile_picture": null, "channel_slug": "streamer"},
    "sender": {"is_anonymous": false, "user_id": 456, "username": "viewer",
               "is_verified": false, "profile_picture": null, "channel_slug": "viewer"},
    "content": "hello",
    "emotes": []
}"#;

fn delivery(message_id: &str, event_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("Kick-Event-Message-Id", message_id)
        .header("Kick-Event-Subscription-Id", "sub-1")
        .header("Kick-Event-Message-Timestamp", "2025-01-01T00:00:00Z")
        .header("Kick-Event-Type", event_type)
        .header("Kick-Event-Version", "1")
        .body(body.into())
        .unwrap()
}

fn sign(message_id: &str, timestamp: &str, body: &str) -> String {
    let der = RSA_PRIVATE_PEM
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect::<String>();
    let der = STANDARD.decode(der).unwrap();
    let key_pair = RsaKeyPair::from_pkcs8(&der).unwrap();

    let message = format!("{message_id}.{timestamp}.{body}");
    let mut signature = vec![0; key_pair.public().modulus_len()];
    key_pair
        .sign(&RSA_PKCS1_SHA256, &SystemRandom::new(), message.as_bytes(), &mut signature)
        .unwrap();

    STANDARD.encode(signature)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn chat_router() -> (Router, mpsc::UnboundedReceiver<(WebhookEventHeader, ChatMessageEvent)>) {
    init_tracing();
    let (tx, rx) = mpsc::unbounded_channel();
    let router = WebhookHandler::builder()
        .disable_verification()
        .tracker(MemoryEventsTracker::new())
        .on_chat_message(move |header, event| {
            tx.send((header, event)).unwrap();
        })
        .build()
        .unwrap()
        .into_router();
    (router, rx)
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    let router = WebhookHandler::builder().build().unwrap().into_router();

    let request = Request::builder().method("GET").uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, "Method is not allowed");
}

#[tokio::test]
async fn test_unreadable_body_is_a_server_error() {
    let router = WebhookHandler::builder().build().unwrap().into_router();

    let stream = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"{")),
        Err(std::io::Error::other("connection reset")),
    ]);
    let request = delivery("msg-1", "chat.message.sent", Body::from_stream(stream));
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Cannot read request body");
}

#[tokio::test]
async fn test_body_over_limit_is_a_server_error() {
    let router = WebhookHandler::builder()
        .disable_verification()
        .body_limit(8)
        .build()
        .unwrap()
        .into_router();

    let (status, body) = send(&router, delivery("msg-1", "chat.message.sent", CHAT_BODY)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Cannot read request body");
}

#[tokio::test]
async fn test_unsigned_delivery_is_forbidden() {
    let router = WebhookHandler::builder().build().unwrap().into_router();

    let (status, body) = send(&router, delivery("msg-1", "chat.message.sent", CHAT_BODY)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Cannot verify event");
}

#[tokio::test]
async fn test_signed_delivery_is_accepted() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let router = WebhookHandler::builder()
        .public_key_pem(RSA_PUBLIC_PEM)
        .on_chat_message(move |_, event| {
            tx.send(event.content).unwrap();
        })
        .build()
        .unwrap()
        .into_router();

    let mut request = delivery("msg-1", "chat.message.sent", CHAT_BODY);
    let signature = sign("msg-1", "2025-01-01T00:00:00Z", CHAT_BODY);
    request
        .headers_mut()
        .insert("kick-event-signature", signature.parse().unwrap());

    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert_eq!(rx.recv().await.unwrap(), "hello");
}

#[tokio::test]
async fn test_tampered_delivery_is_forbidden() {
    let router = WebhookHandler::builder()
        .public_key_pem(RSA_PUBLIC_PEM)
        .build()
        .unwrap()
        .into_router();

    let tampered = CHAT_BODY.replace("hello", "hellO");
    let mut request = delivery("msg-1", "chat.message.sent", tampered);
    let signature = sign("msg-1", "2025-01-01T00:00:00Z", CHAT_BODY);
    request
        .headers_mut()
        .insert("kick-event-signature", signature.parse().unwrap());

    let (status, _) = send(&router, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_event_type_is_a_server_error() {
    let (router, _rx) = chat_router();

    let (status, body) = send(&router, delivery("msg-1", "channel.raided", "{}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Cannot handle event");
}

#[tokio::test]
async fn test_undecodable_body_is_a_server_error() {
    let (router, _rx) = chat_router();

    let (status, body) = send(&router, delivery("msg-1", "chat.message.sent", "not json")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Cannot handle event");
}

#[tokio::test]
async fn test_chat_message_invokes_callback_once() {
    let (router, mut rx) = chat_router();

    let (status, _) = send(&router, delivery("msg-1", "chat.message.sent", CHAT_BODY)).await;
    assert_eq!(status, StatusCode::OK);

    let (header, event) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(header.message_id, "msg-1");
    assert_eq!(header.subscription_id, "sub-1");
    assert_eq!(event.content, "hello");
    assert_eq!(event.sender.username.as_deref(), Some("viewer"));

    assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv())
        .await
        .is_err());
}

#[tokio::test]
async fn test_duplicate_delivery_is_accepted_but_not_dispatched() {
    let (router, mut rx) = chat_router();

    for _ in 0..2 {
        let (status, _) = send(&router, delivery("msg-1", "chat.message.sent", CHAT_BODY)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (header, _) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(header.message_id, "msg-1");

    assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv())
        .await
        .is_err());
}

#[tokio::test]
async fn test_event_without_callback_is_accepted() {
    let (router, mut rx) = chat_router();

    let body = r#"{"broadcaster": {"user_id": 1}, "follower": {"user_id": 2}}"#;
    let (status, _) = send(&router, delivery("msg-1", "channel.followed", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv())
        .await
        .is_err());
}

#[tokio::test]
async fn test_reply_does_not_wait_for_callback() {
    init_tracing();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = std::sync::Mutex::new(release_rx);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let router = WebhookHandler::builder()
        .disable_verification()
        .on_chat_message(move |_, event| {
            release_rx.lock().unwrap().recv().unwrap();
            done_tx.send(event.content).unwrap();
        })
        .build()
        .unwrap()
        .into_router();

    let (status, _) = tokio::time::timeout(
        Duration::from_secs(5),
        send(&router, delivery("msg-1", "chat.message.sent", CHAT_BODY)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(done_rx.try_recv().is_err());

    release_tx.send(()).unwrap();
    let content = tokio::time::timeout(Duration::from_secs(5), done_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(content, "hello");
}
