//! Process-wide chat counters.
//!
//! These are observability only; nothing in the hub reads them back to make
//! decisions. `/debug/vars` exposes [`snapshot`] when metrics are enabled.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::Serialize;

static CONNECTIONS: AtomicI64 = AtomicI64::new(0);
static MESSAGES_TOTAL: AtomicI64 = AtomicI64::new(0);
static RATE_LIMITED_TOTAL: AtomicI64 = AtomicI64::new(0);
static ERRORS_TOTAL: AtomicI64 = AtomicI64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub chat_connections: i64,
    pub chat_messages_total: i64,
    pub chat_rate_limited_total: i64,
    pub chat_errors_total: i64,
}

pub fn inc_connections() {
    CONNECTIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn dec_connections() {
    CONNECTIONS.fetch_sub(1, Ordering::Relaxed);
}

pub fn inc_messages() {
    MESSAGES_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_rate_limited() {
    RATE_LIMITED_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_errors() {
    ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        chat_connections: CONNECTIONS.load(Ordering::Relaxed),
        chat_messages_total: MESSAGES_TOTAL.load(Ordering::Relaxed),
        chat_rate_limited_total: RATE_LIMITED_TOTAL.load(Ordering::Relaxed),
        chat_errors_total: ERRORS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Overwrite every counter with the values in `snapshot`.
pub fn restore(snapshot: MetricsSnapshot) {
    CONNECTIONS.store(snapshot.chat_connections, Ordering::Relaxed);
    MESSAGES_TOTAL.store(snapshot.chat_messages_total, Ordering::Relaxed);
    RATE_LIMITED_TOTAL.store(snapshot.chat_rate_limited_total, Ordering::Relaxed);
    ERRORS_TOTAL.store(snapshot.chat_errors_total, Ordering::Relaxed);
}

pub fn reset() {
    restore(MetricsSnapshot {
        chat_connections: 0,
        chat_messages_total: 0,
        chat_rate_limited_total: 0,
        chat_errors_total: 0,
    });
}
