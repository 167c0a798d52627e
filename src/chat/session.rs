use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::mpsc::{self, error::TrySendError};

use super::events::{Presence, ServerEvent};

/// One connected client.
///
/// The display name is only written by the connection's own read loop, but
/// hub snapshots read it from other tasks, so it sits behind a lock scoped to
/// this session alone. The sender is wrapped so [`Session::close`] can drop it
/// while other tasks still hold the `Arc<Session>`.
#[derive(Debug)]
pub struct Session {
    id: String,
    name: RwLock<String>,
    tx: Mutex<Option<mpsc::Sender<Arc<ServerEvent>>>>,
}

impl Session {
    /// Build a session and the receiving half of its outbound queue.
    pub fn new(
        id: String,
        name: String,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Arc<ServerEvent>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let session = Self {
            id,
            name: RwLock::new(name),
            tx: Mutex::new(Some(tx)),
        };
        (session, rx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the display name, returning the old one.
    pub fn set_name(&self, name: String) -> String {
        let mut current = self.name.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, name)
    }

    pub fn presence(&self) -> Presence {
        Presence {
            id: self.id.clone(),
            name: self.name(),
        }
    }

    /// Non-blocking push. A full or closed queue drops the event and returns false.
    pub fn enqueue(&self, event: Arc<ServerEvent>) -> bool {
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = guard.as_ref() else {
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::trace!(
                    session_id = %self.id,
                    kind = event.kind(),
                    "outbound queue full, dropping event"
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Drop the sender so the writer drains what is queued and then stops.
    pub fn close(&self) {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(true, |tx| tx.is_closed())
    }
}

/// 16 hex chars from 64 random bits.
pub fn new_session_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}
