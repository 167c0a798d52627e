use axum::Json;

use crate::metrics::{self, MetricsSnapshot};

/// Counter dump in the spirit of an expvar endpoint.
pub async fn debug_vars() -> Json<MetricsSnapshot> {
    Json(metrics::snapshot())
}
