use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::events::{ClientMessage, ServerEvent};
use super::hub::Hub;
use super::limiter::RateLimiter;
use super::normalize::{normalize_message, normalize_name};
use super::session::Session;
use crate::config::ChatConfig;
use crate::error::HubError;
use crate::metrics;

/// What happened to one inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Empty,
    Malformed,
    RateLimited,
    Rejected,
    Unchanged,
    Unknown,
    Chat,
    Renamed,
}

/// Per-connection state owned by the read loop: the registered session plus
/// its limiter. Nothing here is shared, so none of it is locked.
pub struct ChatConnection {
    hub: Arc<Hub>,
    session: Arc<Session>,
    limiter: RateLimiter,
    fallback_name: String,
    max_name_len: usize,
    max_message_len: usize,
}

impl ChatConnection {
    /// Build the session for `id` and insert it into the hub. The returned
    /// receiver feeds the writer task.
    pub fn register(
        hub: Arc<Hub>,
        config: &ChatConfig,
        id: String,
        name_hint: Option<&str>,
    ) -> Result<(Self, mpsc::Receiver<Arc<ServerEvent>>), HubError> {
        let fallback_name = format!("Guest-{}", id.chars().take(4).collect::<String>());
        let name = normalize_name(
            name_hint.unwrap_or_default(),
            &fallback_name,
            config.max_name_len,
        );
        let (session, rx) = Session::new(id, name, config.queue_capacity);
        let session = Arc::new(session);

        hub.register(Arc::clone(&session))?;
        metrics::inc_connections();

        let conn = Self {
            hub,
            session,
            limiter: RateLimiter::new(config.rate_per_second, config.rate_burst, Instant::now()),
            fallback_name,
            max_name_len: config.max_name_len,
            max_message_len: config.max_message_len,
        };
        Ok((conn, rx))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send the welcome to this session, then announce the join to everyone.
    /// The snapshot is taken after registration, so it lists this session too.
    pub fn announce(&self) {
        let welcome = ServerEvent::welcome(self.session.presence(), self.hub.snapshot());
        self.session.enqueue(Arc::new(welcome));
        self.hub.broadcast(ServerEvent::join(self.session.presence()));
    }

    pub fn handle_payload(&mut self, data: &[u8], now: Instant) -> Outcome {
        if data.is_empty() {
            return Outcome::Empty;
        }

        let msg: ClientMessage = match serde_json::from_slice(data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(session_id = %self.session.id(), "invalid client message: {e}");
                metrics::inc_errors();
                return Outcome::Malformed;
            }
        };

        match msg.kind.as_str() {
            "chat" => self.handle_chat(&msg.body, now),
            "name" => self.handle_rename(&msg.body),
            other => {
                tracing::debug!(
                    session_id = %self.session.id(),
                    kind = other,
                    "ignoring unknown message type"
                );
                Outcome::Unknown
            }
        }
    }

    fn handle_chat(&mut self, raw: &str, now: Instant) -> Outcome {
        if !self.limiter.allow(now) {
            metrics::inc_rate_limited();
            return Outcome::RateLimited;
        }
        let Some(body) = normalize_message(raw, self.max_message_len) else {
            return Outcome::Rejected;
        };

        self.hub.broadcast(ServerEvent::chat(self.session.presence(), body));
        metrics::inc_messages();
        Outcome::Chat
    }

    fn handle_rename(&mut self, raw: &str) -> Outcome {
        let updated = normalize_name(raw, &self.fallback_name, self.max_name_len);
        if updated == self.session.name() {
            return Outcome::Unchanged;
        }

        let previous = self.session.set_name(updated);
        self.hub
            .broadcast(ServerEvent::rename(self.session.presence(), previous));
        Outcome::Renamed
    }

    /// Leave the hub. Returns whether this call removed the session, which is
    /// also the only case that broadcasts a leave.
    pub fn close(self) -> bool {
        metrics::dec_connections();
        match self.hub.unregister(self.session.id()) {
            Some(session) => {
                self.hub.broadcast(ServerEvent::leave(session.presence()));
                true
            }
            None => false,
        }
    }
}
