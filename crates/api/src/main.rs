use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use questsmith_core::generation::TextGenerator;
use questsmith_gemini::{Credentials, GeminiClient, GeminiConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questsmith_api::background::job_retention;
use questsmith_api::config::ServerConfig;
use questsmith_api::jobs::JobRegistry;
use questsmith_api::router::build_app_router;
use questsmith_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "questsmith_api=debug,questsmith_gemini=debug,tower_http=debug".into()
    });
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        mode = %config.mode,
        template = %config.prompt_template,
        "Loaded server configuration"
    );

    // --- Provider ---
    let gemini_config = GeminiConfig::from_env();
    let credentials = Credentials::from_env().expect("Failed to load Google credentials");
    tracing::info!(
        project = %gemini_config.project_id,
        location = %gemini_config.location,
        model = %gemini_config.model,
        "Gemini client configured"
    );
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(gemini_config, credentials));

    // --- Job registry ---
    let jobs = Arc::new(JobRegistry::new());

    // --- Job retention (opt-in) ---
    let retention_cancel = CancellationToken::new();
    let retention_handle = config.job_retention_secs.map(|secs| {
        tokio::spawn(job_retention::run(
            Arc::clone(&jobs),
            Duration::from_secs(secs),
            Duration::from_secs(config.job_retention_interval_secs.max(1)),
            retention_cancel.clone(),
        ))
    });
    if retention_handle.is_none() {
        tracing::info!("Job retention disabled; finished jobs are kept until restart");
    }

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        jobs: Arc::clone(&jobs),
        generator,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    retention_cancel.cancel();
    if let Some(handle) = retention_handle {
        let _ = tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), handle).await;
        tracing::info!("Job retention loop stopped");
    }

    let counts = jobs.counts().await;
    tracing::info!(
        processing = counts.processing,
        complete = counts.complete,
        failed = counts.failed,
        "Graceful shutdown complete"
    );
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
