//! Failure injection tests for the authenticated request pipeline.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use advanced_sdk::transport::TransportError;
use advanced_sdk::SdkError;
use reqwest::{Method, StatusCode};
use serde_json::json;
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

mod common;
use common::{T0, TOKEN_TTL_MS};

#[tokio::test]
async fn test_server_errors_retry_until_success() {
    let t = common::setup_authenticated("T0").await;

    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(move |_req: &wiremock::Request| {
            if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200).set_body_json(common::user("1"))
            }
        })
        .expect(3)
        .mount(&t.server)
        .await;

    let user = t.sdk.users().get_user_by_id(1).await.unwrap();
    assert_eq!(user["id"], "1");
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_persistent_server_error_stops_after_four_attempts() {
    let t = common::setup_authenticated("T0").await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(4)
        .mount(&t.server)
        .await;

    let err = t.sdk.users().get_user_by_id(1).await.unwrap_err();

    match &err {
        SdkError::Request { method, url, source } => {
            assert_eq!(*method, Method::GET);
            assert!(url.ends_with("/users/1"));
            assert!(matches!(source, TransportError::Server { .. }));
        }
        other => panic!("expected request error, got {:?}", other),
    }
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    // Failed reads are not cached.
    assert!(t.sdk.cache().is_empty());
}

#[tokio::test]
async fn test_client_error_is_not_retried_and_keeps_body() {
    let t = common::setup_authenticated("T0").await;
    Mock::given(method("GET"))
        .and(path("/users/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "User not found"})))
        .expect(1)
        .mount(&t.server)
        .await;

    let err = t.sdk.users().get_user_by_id(999).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.body(), Some(r#"{"message":"User not found"}"#));
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let t = common::setup_authenticated("T0").await;
    Mock::given(method("PUT"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden: Cannot update user 1"})))
        .expect(1)
        .mount(&t.server)
        .await;

    let err = t
        .sdk
        .users()
        .update_user(1, json!({"name": "x"}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
}

#[tokio::test]
async fn test_opt_in_status_is_retried() {
    let t = common::setup_authenticated_with("T0", |config| {
        config.retries.extra_retryable_statuses = vec![429];
    })
    .await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&t.server)
        .await;

    let err = t.sdk.users().get_user_by_id(1).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_slow_responses_time_out_and_retry() {
    let t = common::setup_authenticated_with("T0", |config| config.api.timeout_ms = 100).await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::user("1"))
                .set_delay(Duration::from_millis(400)),
        )
        .expect(4)
        .mount(&t.server)
        .await;

    let err = t.sdk.users().get_user_by_id(1).await.unwrap_err();

    match &err {
        SdkError::Request {
            source: TransportError::Network(e),
            ..
        } => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(t.sdk.cache().is_empty());
}

#[tokio::test]
async fn test_dropped_connections_retry_then_surface_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicU32::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });

    let t = common::setup_authenticated_with("T0", |config| {
        config.api.base_url = format!("http://{}", addr);
    })
    .await;

    let err = t.sdk.users().get_users(None).await.unwrap_err();
    assert!(matches!(
        err,
        SdkError::Request {
            source: TransportError::Network(_),
            ..
        }
    ));
    assert_eq!(err.status(), None);
    assert_eq!(accepted.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_mid_flight_401_renews_and_replays_once() {
    let t = common::setup_authenticated("T0").await;
    common::mount_token_grant(&t.server, "T1", "R1", T0 + 2 * TOKEN_TTL_MS, 1).await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .and(header("authorization", "Bearer T0"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .expect(1)
        .mount(&t.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::user("1")))
        .expect(1)
        .mount(&t.server)
        .await;

    let user = t.sdk.users().get_user_by_id(1).await.unwrap();

    assert_eq!(user["id"], "1");
    assert_eq!(t.sdk.auth().access_token().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_second_401_is_surfaced() {
    let t = common::setup_authenticated("T0").await;
    common::mount_token_grant(&t.server, "T1", "R1", T0 + 2 * TOKEN_TTL_MS, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&t.server)
        .await;

    let err = t.sdk.users().delete_user(1).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(matches!(err, SdkError::Request { .. }));
}

#[tokio::test]
async fn test_401_without_reauthentication_is_surfaced() {
    let t = common::setup_authenticated_with("T0", |config| {
        config.auth.reauthenticate_on_unauthorized = false;
    })
    .await;
    common::mount_token_grant(&t.server, "T1", "R1", T0 + 2 * TOKEN_TTL_MS, 0).await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&t.server)
        .await;

    let err = t.sdk.users().get_user_by_id(1).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(t.sdk.auth().access_token().as_deref(), Some("T0"));
}

#[tokio::test]
async fn test_every_call_carries_a_request_id() {
    let t = common::setup_authenticated("T0").await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&t.server)
        .await;

    let users = t.sdk.users();
    users.get_users(None).await.unwrap();
    t.sdk.cache().clear();
    users.get_users(None).await.unwrap();

    let requests = t.server.received_requests().await.unwrap();
    let ids: Vec<String> = requests
        .iter()
        .map(|r| {
            r.headers
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .expect("request id header")
        })
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}
