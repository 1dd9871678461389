use std::sync::Arc;

use dotenvy::dotenv;
use log::{info, warn};
use tower_http::cors::CorsLayer;

use wisechat::config::AppConfig;
use wisechat::llm::{ConversationalGenerator, RemoteProvider, ReplyStrategy, ResponseOrchestrator};
use wisechat::pipeline::MessagePipeline;
use wisechat::shared::state::AppState;
use wisechat::storage::{ChatStore, MemoryChatStore, PgChatStore};
use wisechat::{gateway, http};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();

    let store: Arc<dyn ChatStore> = match &config.database_url {
        Some(url) => {
            info!("using postgres store");
            Arc::new(PgChatStore::connect(url)?)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store with seed data");
            Arc::new(MemoryChatStore::seeded())
        }
    };

    let mut strategies: Vec<Arc<dyn ReplyStrategy>> = Vec::new();
    if config.provider.use_remote {
        let provider = RemoteProvider::new(&config.provider);
        if provider.is_available() {
            info!("remote provider enabled (model {})", config.provider.model);
            strategies.push(Arc::new(provider));
        } else {
            warn!("remote provider enabled but no API key configured, skipping");
        }
    }

    let orchestrator = ResponseOrchestrator::new(strategies, ConversationalGenerator::new());
    let pipeline = Arc::new(MessagePipeline::new(store.clone(), orchestrator));

    let addr = config.bind_address();
    let state = Arc::new(AppState {
        config,
        store,
        pipeline,
    });

    let app = axum::Router::new()
        .merge(http::routes())
        .merge(gateway::routes())
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
