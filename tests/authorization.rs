//! Interceptor behaviour over a real listener.

use std::time::Duration;

use callgate::telemetry::CallEvent;

mod common;

#[tokio::test]
async fn test_unary_calls_follow_acl() {
    let server = common::start_server().await;

    let (status, body) = server.call(Some("biz_user"), "/biz/Check").await;
    assert_eq!(status, 200);
    assert_eq!(body, "{}");

    assert_eq!(server.call(Some("biz_user"), "/biz/Add").await.0, 200);
    assert_eq!(server.call(Some("biz_user"), "/biz/Test").await.0, 401);
    assert_eq!(server.call(Some("biz_admin"), "/biz/Test").await.0, 200);
    assert_eq!(server.call(Some("unknown"), "/biz/Check").await.0, 401);
    assert_eq!(server.call(None, "/biz/Check").await.0, 401);
}

#[tokio::test]
async fn test_rejection_body_carries_status_code() {
    let server = common::start_server().await;

    let (status, body) = server.call(Some("nobody"), "/biz/Check").await;
    assert_eq!(status, 401);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn test_unregistered_methods_are_unimplemented() {
    let server = common::start_server().await;

    for path in ["/biz/Nope", "/biz/Check/extra", "/nothing"] {
        let (status, body) = server.call(Some("biz_admin"), path).await;
        assert_eq!(status, 404, "{path}");
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["code"], "unimplemented");
    }
    // Unknown callers get the same answer: nothing was authorized.
    assert_eq!(server.call(None, "/biz/Nope").await.0, 404);

    assert_eq!(server.call(Some("biz_admin"), "/biz/Check").await.0, 200);
}

#[tokio::test]
async fn test_stream_setup_is_authorized() {
    let server = common::start_server().await;

    let err = server
        .open_stream("biz_user", "/admin/Logging")
        .await
        .expect_err("biz_user may not open the log");
    assert!(err.to_string().contains("401"), "unexpected error: {err}");
    assert_eq!(server.hub.log_subscribers(), 0);
}

#[tokio::test]
async fn test_only_authorized_calls_reach_the_log() {
    let server = common::start_server().await;
    let mut log = server.open_stream("logger", "/admin/Logging").await.unwrap();
    server.wait_for_log_subscribers(1).await;

    assert_eq!(server.call(Some("biz_user"), "/biz/Test").await.0, 401);
    assert_eq!(server.call(Some("nobody"), "/biz/Check").await.0, 401);
    assert_eq!(server.call(Some("biz_user"), "/biz/Check").await.0, 200);

    let event: CallEvent = common::next_json(&mut log, Duration::from_secs(2)).await;
    assert_eq!(event.consumer, "biz_user");
    assert_eq!(event.method, "biz/Check");
    assert!(event.host.starts_with("127.0.0.1:"));
    assert!(event.timestamp > 0);

    assert!(common::stays_quiet(&mut log, Duration::from_millis(200)).await);
}
