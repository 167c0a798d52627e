pub mod connection;
pub mod events;
pub mod hub;
pub mod limiter;
pub mod normalize;
pub mod session;
pub mod writer;

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::{Sink, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::metrics;
use crate::state::AppState;
use connection::ChatConnection;
use events::ServerEvent;
use session::new_session_id;

pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(params): Query<Vec<(String, String)>>,
    State(state): State<AppState>,
) -> Response {
    let name_hint = name_hint(params);
    ws.on_failed_upgrade(|e: axum::Error| {
        tracing::warn!("websocket upgrade failed: {e}");
        metrics::inc_errors();
    })
    .on_upgrade(move |socket| handle_socket(socket, state, name_hint))
}

/// First `name` value of the query string; repeats are ignored.
fn name_hint(params: Vec<(String, String)>) -> Option<String> {
    params
        .into_iter()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value)
}

async fn handle_socket(socket: WebSocket, state: AppState, name_hint: Option<String>) {
    let registered = ChatConnection::register(
        Arc::clone(&state.hub),
        &state.chat,
        new_session_id(),
        name_hint.as_deref(),
    );
    let (conn, rx) = match registered {
        Ok(registered) => registered,
        Err(e) => {
            tracing::error!("failed to register chat session: {e}");
            metrics::inc_errors();
            return;
        }
    };

    let (ws_sink, ws_stream) = socket.split();
    serve_connection(conn, rx, ws_stream, ws_sink, state.chat.write_timeout).await;
}

/// Drive a registered connection until either half of the transport gives out,
/// then unregister it.
///
/// Reads stay on this task, one message at a time. A dead writer means the peer
/// is unreachable, so it ends the connection as well.
pub async fn serve_connection<St, Si, E>(
    mut conn: ChatConnection,
    rx: mpsc::Receiver<Arc<ServerEvent>>,
    mut stream: St,
    sink: Si,
    write_timeout: Duration,
) where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
    Si: Sink<Message> + Unpin + Send + 'static,
    Si::Error: Display,
{
    let session_id = conn.session().id().to_string();
    tracing::info!(%session_id, name = %conn.session().name(), "chat session connected");

    let mut writer = tokio::spawn(writer::write_loop(
        sink,
        rx,
        write_timeout,
        session_id.clone(),
    ));

    conn.announce();

    let writer_finished = loop {
        tokio::select! {
            _ = &mut writer => break true,
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        conn.handle_payload(text.as_bytes(), Instant::now());
                    }
                    Some(Ok(Message::Binary(data))) => {
                        conn.handle_payload(&data, Instant::now());
                    }
                    Some(Ok(Message::Close(_))) | None => break false,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(%session_id, "websocket read failed: {e}");
                        metrics::inc_errors();
                        break false;
                    }
                }
            }
        }
    };

    conn.close();
    if !writer_finished {
        let _ = writer.await;
    }
    tracing::info!(%session_id, "chat session disconnected");
}
