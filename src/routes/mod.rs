mod health;
mod metrics;

use std::path::Path;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

/// Build the application router. Optional surfaces (chat, metrics, static
/// files) are mounted according to `config`.
pub fn router(config: &Config, state: AppState) -> Router {
    let mut app: Router<AppState> = Router::new().route("/healthz", get(health::health));

    if config.metrics_enabled {
        app = app.route("/debug/vars", get(metrics::debug_vars));
    }

    if config.chat_enabled {
        app = app.route("/ws", get(crate::chat::ws_upgrade));
    }

    if let Some(dir) = config.static_dir.as_deref().filter(|dir| usable_static_dir(dir)) {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

fn usable_static_dir(dir: &Path) -> bool {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => true,
        Ok(_) => {
            tracing::warn!("static path {:?} is not a directory; skipping", dir);
            false
        }
        Err(e) => {
            tracing::warn!("static directory {:?} unavailable; skipping: {e}", dir);
            false
        }
    }
}
