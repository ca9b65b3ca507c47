use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkforge_api::config::{GeneratorConfig, ServerConfig};
use inkforge_api::export::DiskExportSink;
use inkforge_api::router::build_app_router;
use inkforge_api::state::{AppState, ProviderStatus};
use inkforge_pipeline::export::ExportSink;
use inkforge_pipeline::orchestrator::Orchestrator;
use inkforge_pipeline::registry::JobRegistry;
use inkforge_pipeline::runner::JobRunner;
use inkforge_providers::media::{ImageGenerator, ModelsLabClient, VideoGenerator};
use inkforge_providers::text::{OpenRouterClient, TextGenerator};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkforge_api=debug,inkforge_pipeline=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let server_config = ServerConfig::from_env();
    let generator_config = GeneratorConfig::from_env();
    tracing::info!(
        host = %server_config.host,
        port = server_config.port,
        output_dir = %generator_config.output_dir.display(),
        "Loaded configuration",
    );

    std::fs::create_dir_all(&generator_config.output_dir)
        .expect("Failed to create output directory");

    // --- Providers ---
    let providers = ProviderStatus {
        text_configured: generator_config.openrouter_api_key.is_some(),
        media_configured: generator_config.modelslab_api_key.is_some(),
    };
    if !providers.text_configured {
        tracing::warn!("OPENROUTER_API_KEY not set; text generation will fail");
    }
    if !providers.media_configured {
        tracing::warn!("MODELSLAB_API_KEY not set; image/video generation will fail");
    }

    let text = Arc::new(OpenRouterClient::new(
        generator_config.openrouter_api_key.clone().unwrap_or_default(),
        generator_config.openrouter_model.clone(),
    ));
    let media = Arc::new(ModelsLabClient::new(
        generator_config.modelslab_api_key.clone().unwrap_or_default(),
    ));
    let sink = Arc::new(DiskExportSink::new(generator_config.output_dir.clone()));

    // --- Pipeline ---
    let registry = Arc::new(JobRegistry::new());
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&registry),
        Arc::clone(&text) as Arc<dyn TextGenerator>,
        Arc::clone(&media) as Arc<dyn ImageGenerator>,
        Arc::clone(&media) as Arc<dyn VideoGenerator>,
        Arc::clone(&sink) as Arc<dyn ExportSink>,
        generator_config.pipeline_config(),
    ));
    let runner = Arc::new(JobRunner::new(
        orchestrator,
        generator_config.max_concurrent_jobs,
    ));
    tracing::info!(
        max_concurrent_jobs = generator_config.max_concurrent_jobs,
        "Pipeline runner started",
    );

    // --- App state and router ---
    let state = AppState {
        registry,
        runner: Arc::clone(&runner),
        config: Arc::new(server_config.clone()),
        generator: Arc::new(generator_config),
        providers,
    };
    let app = build_app_router(state, &server_config);

    // --- Start server ---
    let addr = SocketAddr::new(
        server_config.host.parse().expect("Invalid HOST address"),
        server_config.port,
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
    runner.shutdown();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
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
