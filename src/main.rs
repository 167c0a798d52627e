use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use relayserver::config::Config;
use relayserver::state::AppState;

/// Command-line overrides; anything left unset comes from the environment.
#[derive(Debug, Parser)]
#[command(name = "relayserver", version, about = "Real-time presence and chat relay")]
struct Cli {
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,
    /// Directory of static assets; pass an empty string to disable
    #[arg(long)]
    static_dir: Option<PathBuf>,
    /// Expose counters on /debug/vars
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relayserver=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = cli.static_dir {
        config.static_dir = (!dir.as_os_str().is_empty()).then_some(dir);
    }
    if cli.metrics {
        config.metrics_enabled = true;
    }

    print_banner(&config);

    let state = AppState::new(config.chat.clone());
    let app = relayserver::routes::router(&config, state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("failed to bind");

    let actual_port = listener
        .local_addr()
        .expect("failed to get local address")
        .port();
    tracing::info!("listening on 0.0.0.0:{actual_port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server stopped");
}

fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    let static_dir = config
        .static_dir
        .as_ref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "disabled".to_string());
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };

    eprintln!();
    eprintln!("  \x1b[1;36mrelay\x1b[0m \x1b[2mv{version}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mport\x1b[0m         {}", config.port);
    eprintln!("  \x1b[2mstatic\x1b[0m       {static_dir}");
    eprintln!("  \x1b[2mchat\x1b[0m         {}", on_off(config.chat_enabled));
    eprintln!("  \x1b[2mmetrics\x1b[0m      {}", on_off(config.metrics_enabled));
    eprintln!(
        "  \x1b[2mrate\x1b[0m         {}/s, burst {}",
        config.chat.rate_per_second, config.chat.rate_burst
    );
    eprintln!();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
