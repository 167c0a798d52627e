use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;

use super::events::ServerEvent;
use crate::error::TransportError;
use crate::metrics;

/// Drain a session's outbound queue into the socket.
///
/// Returns `Ok` once the queue is closed and empty. Any failed or timed-out
/// send ends the loop with an error; the connection is then torn down.
pub async fn write_loop<S>(
    mut sink: S,
    mut rx: mpsc::Receiver<Arc<ServerEvent>>,
    write_timeout: Duration,
    session_id: String,
) -> Result<(), TransportError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(event) = rx.recv().await {
        let payload = match serde_json::to_string(&*event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(%session_id, "failed to encode event: {e}");
                continue;
            }
        };

        let send = sink.send(Message::Text(payload.into()));
        let result = match tokio::time::timeout(write_timeout, send).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(TransportError::Write(e.to_string())),
            Err(_) => Err(TransportError::WriteTimeout(write_timeout)),
        };
        if let Err(e) = result {
            tracing::warn!(%session_id, "failed to write websocket message: {e}");
            metrics::inc_errors();
            return Err(e);
        }
    }

    let _ = tokio::time::timeout(write_timeout, sink.close()).await;
    Ok(())
}
