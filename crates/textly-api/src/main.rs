use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use textly_api::{config::Config, routes::build_router, state::AppState};
use textly_chat::{StreamerConfig, TurnOrchestrator};
use textly_llm::{ChatClient, OpenAIClient};
use textly_persist::PersistClientBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Textly API server");
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        storage = %config.storage.backend,
        default_model = %config.llm.default_model,
        "Config loaded"
    );

    tracing::info!(base_url = %config.llm.base_url, "Initializing LLM client");
    let chat_client: Arc<dyn ChatClient> = Arc::new(OpenAIClient::with_base_url(
        config.openai_api_key.clone(),
        config.llm.base_url.clone(),
    )?);

    let persist = PersistClientBuilder::new()
        .backend(config.storage.backend)
        .mongodb_uri(&config.mongodb_uri)
        .database(&config.mongodb.database)
        .build()
        .await?;
    tracing::info!(backend = %config.storage.backend, "Storage ready");

    let orchestrator = TurnOrchestrator::builder()
        .chat_client(chat_client)
        .ledger(persist.ledger().clone())
        .default_model(&config.llm.default_model)
        .streamer_config(StreamerConfig {
            temperature: Some(config.llm.temperature),
            max_tokens: Some(config.llm.max_tokens),
            idle_timeout: config.llm.stream_idle_timeout(),
        })
        .build()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, persist, orchestrator));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
