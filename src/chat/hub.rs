use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::events::{Presence, ServerEvent};
use super::session::Session;
use crate::error::HubError;

/// Registry of live sessions and the fan-out point for every event.
///
/// The lock guards only map access. Broadcasting copies the member list out
/// and enqueues after the guard is gone, so a stalled recipient never holds up
/// registration or other broadcasters.
#[derive(Debug, Default)]
pub struct Hub {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, session: Arc<Session>) -> Result<(), HubError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(session.id()) {
            return Err(HubError::DuplicateId(session.id().to_string()));
        }
        sessions.insert(session.id().to_string(), session);
        Ok(())
    }

    /// Remove `id` and close its queue. Returns the session only when it was
    /// actually present, so callers announce a leave at most once.
    pub fn unregister(&self, id: &str) -> Option<Arc<Session>> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if let Some(session) = &removed {
            session.close();
        }
        removed
    }

    pub fn snapshot(&self) -> Vec<Presence> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|session| session.presence())
            .collect()
    }

    /// Best-effort delivery to every registered session.
    pub fn broadcast(&self, event: ServerEvent) {
        let members: Vec<Arc<Session>> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let event = Arc::new(event);
        for session in &members {
            session.enqueue(Arc::clone(&event));
        }
    }
}

#[cfg(test)]
impl Hub {
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
