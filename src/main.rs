use clap::Parser;
use sage::{api::routes, AppState, Config, GeminiClient, RagService};
use sage_vector::VectorDb;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "sage-server",
    version,
    about = "S.A.G.E - session-isolated document Q&A server"
)]
struct Cli {
    /// Host to bind; overrides HOST from the environment.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind; overrides PORT from the environment.
    #[arg(long)]
    port: Option<u16>,

    /// Extra env file loaded before configuration is read.
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config::from_env also honors a .env in the working directory;
    // an explicit file is loaded first so its values win.
    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path)?;
    }

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sage=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let config = Arc::new(config);

    let embedder = build_embedder(&config)?;
    let generator = Arc::new(GeminiClient::new(&config.generation)?);
    let service = Arc::new(RagService::new(
        &config,
        embedder,
        generator,
        VectorDb::new(),
    )?);

    let sweep = service.start_sweep_task(Duration::from_secs(config.session.sweep_interval_secs));

    let state = AppState {
        config: config.clone(),
        service,
    };

    let app = axum::Router::new()
        .nest("/api", routes::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(%addr, model = %config.generation.model, "S.A.G.E listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep.abort();
    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(feature = "local-embeddings")]
fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn sage::EmbeddingProvider>> {
    Ok(Arc::new(sage::FastEmbedProvider::new(
        &config.rag.embedding_model,
        config.rag.embedding_batch_size,
    )?))
}

#[cfg(not(feature = "local-embeddings"))]
fn build_embedder(_config: &Config) -> anyhow::Result<Arc<dyn sage::EmbeddingProvider>> {
    anyhow::bail!(
        "built without the local-embeddings feature; no embedding backend is available"
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
