//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use callgate::auth::AccessControlList;
use callgate::config::ServiceConfig;
use callgate::{RpcServer, Shutdown, TelemetryHub};
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub const ACL: &str = r#"{
    "logger":    ["/admin/Logging"],
    "stat":      ["/admin/Statistics"],
    "biz_user":  ["/biz/Check", "/biz/Add"],
    "biz_admin": ["/biz/*"]
}"#;

pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub hub: Arc<TelemetryHub>,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_server() -> TestServer {
    let acl = AccessControlList::from_json(ACL).unwrap();
    let server = RpcServer::new(ServiceConfig::default(), acl);
    let hub = server.hub();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        hub,
        shutdown,
        client: reqwest::Client::builder().no_proxy().build().unwrap(),
    }
}

impl TestServer {
    /// Unary call, returns the HTTP status code and body.
    pub async fn call(&self, consumer: Option<&str>, method: &str) -> (u16, String) {
        let mut req = self
            .client
            .post(format!("http://{}{}", self.addr, method))
            .json(&serde_json::json!({}));
        if let Some(c) = consumer {
            req = req.header("consumer", c);
        }
        let res = req.send().await.expect("server unreachable");
        let status = res.status().as_u16();
        (status, res.text().await.unwrap())
    }

    /// Open a stream endpoint as `consumer`.
    pub async fn open_stream(
        &self,
        consumer: &str,
        path: &str,
    ) -> Result<Ws, tokio_tungstenite::tungstenite::Error> {
        let mut request = format!("ws://{}{}", self.addr, path)
            .into_client_request()
            .unwrap();
        request
            .headers_mut()
            .insert("consumer", HeaderValue::from_str(consumer).unwrap());
        let (ws, _) = tokio_tungstenite::connect_async(request).await?;
        Ok(ws)
    }

    /// Wait until the hub reports the given number of log subscribers.
    pub async fn wait_for_log_subscribers(&self, expected: usize) {
        let hub = self.hub.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while hub.log_subscribers() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("log subscriber count never settled");
    }

    pub async fn wait_for_stat_subscribers(&self, expected: usize) {
        let hub = self.hub.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while hub.stat_subscribers() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("stat subscriber count never settled");
    }
}

/// Next JSON text frame, failing the test after `within`.
pub async fn next_json<T: serde::de::DeserializeOwned>(ws: &mut Ws, within: Duration) -> T {
    loop {
        let msg = tokio::time::timeout(within, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("transport error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// `true` if no frame arrives within `within`.
pub async fn stays_quiet(ws: &mut Ws, within: Duration) -> bool {
    tokio::time::timeout(within, ws.next()).await.is_err()
}
