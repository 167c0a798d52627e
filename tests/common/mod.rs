#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use relayserver::config::{ChatConfig, Config};
use relayserver::routes;
use relayserver::state::AppState;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything on, no static files, default chat limits.
pub fn test_config() -> Config {
    Config {
        port: 0,
        static_dir: None,
        chat_enabled: true,
        metrics_enabled: true,
        chat: ChatConfig::default(),
    }
}

pub fn test_app(config: &Config) -> Router {
    routes::router(config, AppState::new(config.chat.clone()))
}

/// Binds a TCP listener on port 0, spawns the server, and returns the ws base URL.
pub async fn spawn_server(config: Config) -> String {
    let app = test_app(&config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://127.0.0.1:{}", addr.port())
}

pub async fn connect(base: &str, name: Option<&str>) -> WsClient {
    let url = match name {
        Some(name) => format!("{base}/ws?name={name}"),
        None => format!("{base}/ws"),
    };
    let (ws, _) = connect_async(url).await.expect("websocket dial failed");
    ws
}

/// Next JSON event from the server, skipping control frames.
pub async fn next_event(ws: &mut WsClient) -> serde_json::Value {
    tokio::time::timeout(READ_TIMEOUT, async {
        loop {
            let msg = ws
                .next()
                .await
                .expect("stream ended")
                .expect("read failed");
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).expect("event is not JSON");
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// True when no text frame arrives within `wait`.
pub async fn stays_quiet(ws: &mut WsClient, wait: Duration) -> bool {
    tokio::time::timeout(wait, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(_))) => return,
                Some(Ok(_)) => continue,
                _ => std::future::pending::<()>().await,
            }
        }
    })
    .await
    .is_err()
}

pub async fn send_json(ws: &mut WsClient, value: serde_json::Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send failed");
}

/// Connect and consume the welcome and self-join, returning the welcome.
pub async fn join(base: &str, name: &str) -> (WsClient, serde_json::Value) {
    let mut ws = connect(base, Some(name)).await;
    let welcome = next_event(&mut ws).await;
    assert_eq!(welcome["type"], "welcome");
    let join = next_event(&mut ws).await;
    assert_eq!(join["type"], "presence");
    assert_eq!(join["action"], "join");
    (ws, welcome)
}

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("relayserver-test-{:016x}", rand::random::<u64>()));
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}
