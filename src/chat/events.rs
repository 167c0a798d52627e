use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Public identity of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceAction {
    Join,
    Leave,
    Rename,
}

/// Event pushed from the hub to session queues. Shared behind `Arc` once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    Welcome {
        from: Presence,
        users: Vec<Presence>,
        at: String,
    },
    #[serde(rename = "presence")]
    PresenceUpdate {
        action: PresenceAction,
        from: Presence,
        /// Previous name, set on rename only.
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        at: String,
    },
    Chat {
        from: Presence,
        body: String,
        at: String,
    },
}

impl ServerEvent {
    pub fn welcome(from: Presence, users: Vec<Presence>) -> Self {
        ServerEvent::Welcome {
            from,
            users,
            at: timestamp(),
        }
    }

    pub fn join(from: Presence) -> Self {
        ServerEvent::PresenceUpdate {
            action: PresenceAction::Join,
            from,
            body: None,
            at: timestamp(),
        }
    }

    pub fn leave(from: Presence) -> Self {
        ServerEvent::PresenceUpdate {
            action: PresenceAction::Leave,
            from,
            body: None,
            at: timestamp(),
        }
    }

    pub fn rename(from: Presence, previous: String) -> Self {
        ServerEvent::PresenceUpdate {
            action: PresenceAction::Rename,
            from,
            body: Some(previous),
            at: timestamp(),
        }
    }

    pub fn chat(from: Presence, body: String) -> Self {
        ServerEvent::Chat {
            from,
            body,
            at: timestamp(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Welcome { .. } => "welcome",
            ServerEvent::PresenceUpdate { .. } => "presence",
            ServerEvent::Chat { .. } => "chat",
        }
    }
}

/// Inbound frame from a client. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub body: String,
}

/// Current UTC time as RFC 3339 with second precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
